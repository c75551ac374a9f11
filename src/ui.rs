pub mod screen;

use itertools::Itertools;
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Widget, Wrap},
};
use unicode_width::UnicodeWidthStr;

use crate::app::{App, AppState};
use crate::exercise::blanks::{first_letter_hint, BLANK_MARKER};
use crate::exercise::masking::MASK_MARKER;
use crate::exercise::{ExerciseType, WordStatus};
use crate::session::{
    AnswerStatus, FillBlanksSession, Phase, ReferenceQuizSession, ReflectionSession, Session,
    TypingSession,
};

const HORIZONTAL_MARGIN: u16 = 5;
const VERTICAL_MARGIN: u16 = 2;

struct Styles {
    bold: Style,
    green_bold: Style,
    yellow_bold: Style,
    red_bold: Style,
    dim_bold: Style,
    underlined_dim_bold: Style,
    italic: Style,
    magenta: Style,
}

impl Styles {
    fn new() -> Self {
        let bold = Style::default().add_modifier(Modifier::BOLD);
        let dim_bold = Style::default().patch(bold).add_modifier(Modifier::DIM);
        Self {
            bold,
            green_bold: Style::default().patch(bold).fg(Color::Green),
            yellow_bold: Style::default().patch(bold).fg(Color::Yellow),
            red_bold: Style::default().patch(bold).fg(Color::Red),
            dim_bold,
            underlined_dim_bold: Style::default()
                .patch(dim_bold)
                .add_modifier(Modifier::UNDERLINED),
            italic: Style::default().add_modifier(Modifier::ITALIC),
            magenta: Style::default().fg(Color::Magenta),
        }
    }
}

impl Widget for &App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        match self.state {
            AppState::Menu => render_menu(self, area, buf),
            AppState::Exercise => render_exercise(self, area, buf),
            AppState::Results => render_results(self, area, buf),
        }
    }
}

/// Vertical split used by every screen: header, body, notice, legend
fn frame_chunks(area: Rect) -> Vec<Rect> {
    Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .vertical_margin(VERTICAL_MARGIN)
        .constraints([
            Constraint::Length(2),
            Constraint::Min(1),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(area)
        .to_vec()
}

fn render_header(app: &App, area: Rect, buf: &mut Buffer, styles: &Styles) {
    let verse = &app.weekly.verse;
    let header = Line::from(vec![
        Span::styled(verse.reference().to_string(), styles.bold),
        Span::styled(format!(" ({})", verse.translation()), styles.dim_bold),
        Span::raw("   "),
        Span::styled(format!("day {} of 7", app.day), styles.magenta),
        Span::raw("   "),
        Span::styled(
            format!("{}/{} exercises", app.completed.len(), ExerciseType::ALL.len()),
            styles.italic,
        ),
    ]);
    Paragraph::new(header)
        .alignment(Alignment::Center)
        .render(area, buf);
}

fn render_footer(app: &App, chunks: &[Rect], legend: &str, buf: &mut Buffer, styles: &Styles) {
    if let Some(notice) = &app.notice {
        Paragraph::new(Span::styled(
            notice.clone(),
            Style::default().fg(Color::Yellow).add_modifier(Modifier::ITALIC),
        ))
        .alignment(Alignment::Center)
        .render(chunks[2], buf);
    }
    Paragraph::new(Span::styled(legend.to_string(), styles.italic)).render(chunks[3], buf);
}

fn render_menu(app: &App, area: Rect, buf: &mut Buffer) {
    let styles = Styles::new();
    let chunks = frame_chunks(area);
    render_header(app, chunks[0], buf, &styles);

    let mut lines = Vec::new();
    if let Some(before) = &app.weekly.context_before {
        lines.push(Line::from(Span::styled(before.clone(), styles.dim_bold)));
    }
    lines.push(Line::from(Span::styled(
        app.weekly.verse.text().to_string(),
        styles.bold,
    )));
    if let Some(after) = &app.weekly.context_after {
        lines.push(Line::from(Span::styled(after.clone(), styles.dim_bold)));
    }
    lines.push(Line::default());
    if let Some(background) = &app.weekly.background {
        lines.push(Line::from(Span::styled(background.clone(), styles.italic)));
        lines.push(Line::default());
    }

    for (idx, exercise) in ExerciseType::ALL.iter().enumerate() {
        let selected = idx == app.menu_index;
        let marker = if app.is_completed(*exercise) { "✓" } else { " " };
        let title_style = if selected {
            styles.magenta.add_modifier(Modifier::BOLD | Modifier::REVERSED)
        } else {
            styles.bold
        };
        lines.push(Line::from(vec![
            Span::styled(format!("{marker} {}. ", idx + 1), styles.green_bold),
            Span::styled(exercise.title().to_string(), title_style),
            Span::styled(format!("  [{}]", exercise.difficulty()), styles.dim_bold),
        ]));
        lines.push(Line::from(Span::styled(
            format!("     {}", exercise.description()),
            styles.italic,
        )));
    }

    if app.all_completed() {
        lines.push(Line::default());
        lines.push(Line::from(Span::styled(
            "every exercise done for this verse",
            styles.green_bold,
        )));
    }

    Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .render(chunks[1], buf);
    render_footer(
        app,
        &chunks,
        "(↑/↓) select / (enter) start / (1-4) jump / (q)uit",
        buf,
        &styles,
    );
}

fn render_exercise(app: &App, area: Rect, buf: &mut Buffer) {
    let styles = Styles::new();
    let chunks = frame_chunks(area);
    render_header(app, chunks[0], buf, &styles);

    let legend = match &app.session {
        Some(Session::Typing(s)) => {
            render_typing(s, chunks[1], buf, &styles);
            if s.state().phase == Phase::RoundComplete {
                "(enter) next round / (esc) menu"
            } else if s.hints_available() {
                "(tab) hints / (esc) menu"
            } else {
                "(esc) menu"
            }
        }
        Some(Session::FillBlanks(s)) => {
            render_fill_blanks(s, app.cursor, chunks[1], buf, &styles);
            "(tab) next blank / (shift+tab) previous / (esc) menu"
        }
        Some(Session::ReferenceQuiz(s)) => {
            render_quiz(s, app.cursor, chunks[1], buf, &styles);
            "(1-4) answer / (↑/↓ enter) pick / (esc) menu"
        }
        Some(Session::Reflection(s)) => {
            render_reflection(s, chunks[1], buf, &styles);
            "(enter) save / (tab) next prompt / (esc) menu"
        }
        None => "(esc) menu",
    };
    render_footer(app, &chunks, legend, buf, &styles);
}

fn render_typing(session: &TypingSession, area: Rect, buf: &mut Buffer, styles: &Styles) {
    let masked = session.masked();
    let statuses = session.word_statuses();

    let verse_spans: Vec<Span> = session
        .words()
        .iter()
        .zip(statuses)
        .flat_map(|(word, status)| {
            let shown = if session.hints_visible() && status == WordStatus::Upcoming {
                first_letter_hint(&word.raw)
            } else if masked.is_masked(word.index) {
                MASK_MARKER.to_string()
            } else {
                word.raw.clone()
            };
            let style = match status {
                WordStatus::Correct => styles.green_bold,
                WordStatus::Partial => styles.yellow_bold,
                WordStatus::Incorrect => styles.red_bold,
                WordStatus::Upcoming => styles.dim_bold,
            };
            [Span::styled(shown, style), Span::raw(" ")]
        })
        .collect();

    let status_line = match session.state().phase {
        Phase::RoundComplete => Span::styled(
            format!("round {} complete", session.round()),
            styles.green_bold,
        ),
        _ => Span::styled(
            format!(
                "round {}/{}   {}% typed   {}% accurate",
                session.round(),
                session.total_rounds(),
                session.progress_percent(),
                session.accuracy()
            ),
            styles.magenta,
        ),
    };

    let mut input_spans = vec![Span::styled(session.input().to_string(), styles.bold)];
    input_spans.push(Span::styled("_", styles.underlined_dim_bold));

    let single_line = session.verse().text().width() <= area.width as usize;
    Paragraph::new(vec![
        Line::from(status_line),
        Line::default(),
        Line::from(verse_spans),
        Line::default(),
        Line::from(input_spans),
    ])
    .alignment(if single_line {
        Alignment::Center
    } else {
        Alignment::Left
    })
    .wrap(Wrap { trim: true })
    .render(area, buf);
}

fn render_fill_blanks(
    session: &FillBlanksSession,
    cursor: usize,
    area: Rect,
    buf: &mut Buffer,
    styles: &Styles,
) {
    let spans: Vec<Span> = session
        .words()
        .iter()
        .flat_map(|word| {
            let span = if session.blanks().contains(word.index) {
                let mut style = match session.answer_status(word.index) {
                    AnswerStatus::Empty => styles.dim_bold,
                    AnswerStatus::Correct => styles.green_bold,
                    AnswerStatus::Incorrect => styles.red_bold,
                };
                if word.index == cursor {
                    style = style.add_modifier(Modifier::UNDERLINED);
                }
                let shown = session
                    .answer(word.index)
                    .map(str::to_string)
                    .unwrap_or_else(|| BLANK_MARKER.to_string());
                Span::styled(shown, style)
            } else {
                Span::styled(word.raw.clone(), styles.bold)
            };
            [span, Span::raw(" ")]
        })
        .collect();

    let hint = session
        .hint(cursor)
        .map(|h| format!("hint: {h}"))
        .unwrap_or_default();

    Paragraph::new(vec![
        Line::from(Span::styled(
            format!(
                "{}/{} blanks filled   {:.0}% hidden   {}% correct",
                session.filled_count(),
                session.blanks().len(),
                session.difficulty_percent(),
                session.accuracy()
            ),
            styles.magenta,
        )),
        Line::default(),
        Line::from(spans),
        Line::default(),
        Line::from(Span::styled(hint, styles.italic)),
    ])
    .wrap(Wrap { trim: true })
    .render(area, buf);
}

fn render_quiz(
    session: &ReferenceQuizSession,
    cursor: usize,
    area: Rect,
    buf: &mut Buffer,
    styles: &Styles,
) {
    let mut lines = vec![
        Line::from(Span::styled(session.verse().text().to_string(), styles.italic)),
        Line::default(),
    ];

    if let Some(question) = session.current_question() {
        lines.push(Line::from(Span::styled(
            format!(
                "question {}/{}: {}",
                session.current_index() + 1,
                session.questions().len(),
                question.prompt
            ),
            styles.bold,
        )));
        lines.push(Line::default());
        for (idx, option) in question.options.iter().enumerate() {
            let style = if idx == cursor {
                styles.magenta.add_modifier(Modifier::BOLD | Modifier::REVERSED)
            } else {
                styles.dim_bold
            };
            lines.push(Line::from(Span::styled(format!("{}. {option}", idx + 1), style)));
        }
    }

    if !session.answers().is_empty() {
        lines.push(Line::default());
        lines.push(Line::from(Span::styled(
            format!("answered: {}", session.answers().iter().join(" / ")),
            styles.italic,
        )));
    }

    Paragraph::new(lines)
        .wrap(Wrap { trim: true })
        .render(area, buf);
}

fn render_reflection(session: &ReflectionSession, area: Rect, buf: &mut Buffer, styles: &Styles) {
    let prompts = session.responses().len();
    let lines = vec![
        Line::from(Span::styled(session.verse().text().to_string(), styles.italic)),
        Line::default(),
        Line::from(Span::styled(
            format!(
                "prompt {}/{} ({} answered): {}",
                session.current() + 1,
                prompts,
                session.answered_count(),
                session.current_prompt()
            ),
            styles.bold,
        )),
        Line::default(),
        Line::from(vec![
            Span::styled(session.draft().to_string(), styles.green_bold),
            Span::styled("_", styles.underlined_dim_bold),
        ]),
    ];

    Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .render(area, buf);
}

fn render_results(app: &App, area: Rect, buf: &mut Buffer) {
    let styles = Styles::new();
    let chunks = frame_chunks(area);
    render_header(app, chunks[0], buf, &styles);

    let mut lines = Vec::new();
    if let Some(event) = &app.last_event {
        lines.push(Line::from(Span::styled(
            format!("{} complete", event.exercise_type.title()),
            styles.green_bold,
        )));
        lines.push(Line::default());

        let mut stats = vec![
            format!("{}% acc", event.accuracy_percent),
            format!("{:.1}s", event.time_spent_ms as f64 / 1000.0),
        ];
        if let Some(round) = event.round {
            stats.push(format!("round {round}"));
        }
        lines.push(Line::from(Span::styled(stats.iter().join("   "), styles.bold)));
    }

    if let Some(avg) = app.average_accuracy() {
        lines.push(Line::from(Span::styled(
            format!("{avg:.0}% average this session"),
            Style::default().fg(Color::Cyan).add_modifier(Modifier::ITALIC),
        )));
    }

    let remaining = ExerciseType::ALL
        .iter()
        .filter(|t| !app.is_completed(**t))
        .map(|t| t.title())
        .join(", ");
    lines.push(Line::default());
    lines.push(if remaining.is_empty() {
        Line::from(Span::styled(
            "every exercise done for this verse",
            styles.green_bold,
        ))
    } else {
        Line::from(Span::styled(format!("still to do: {remaining}"), styles.italic))
    });

    Paragraph::new(lines)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .render(chunks[1], buf);
    render_footer(app, &chunks, "(r)etry / (m)enu / (q)uit", buf, &styles);
}
