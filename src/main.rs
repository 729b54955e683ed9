mod app;
mod event;
mod ui;

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::Parser;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Alignment, Constraint, Direction, Layout};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph};
use tracing::{error, info};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use examtyper::config::Config;
use examtyper::exam::{ExamCategory, user_exams_dir};
use examtyper::session::state::{SessionState, TypingMode};

use app::{App, AppScreen, Options};
use event::{AppEvent, EventHandler};
use ui::components::dashboard::Dashboard;
use ui::components::progress_bar::ProgressBar;
use ui::components::stats_sidebar::{StatsSidebar, compact_stats};
use ui::components::typing_area::{TypedText, TypingArea};
use ui::layout::{TestLayout, centered_rect, pack_hint_lines};
use ui::theme::Theme;

#[derive(Parser)]
#[command(
    name = "examtyper",
    version,
    about = "Terminal typing test with government-exam qualification rules"
)]
struct Cli {
    #[arg(short, long, help = "Exam category id; starts the test directly (see --list-exams)")]
    exam: Option<String>,

    #[arg(short, long, help = "Typing mode: screen or paper")]
    mode: Option<TypingMode>,

    #[arg(
        short,
        long,
        value_name = "SECS",
        value_parser = clap::value_parser!(u64).range(1..),
        help = "Override the exam duration"
    )]
    duration: Option<u64>,

    #[arg(short, long, value_name = "FILE", help = "Type passages from a .txt or .toml file")]
    passage_file: Option<PathBuf>,

    #[arg(short, long, help = "Theme name")]
    theme: Option<String>,

    #[arg(long, help = "Print the available exam categories and exit")]
    list_exams: bool,

    #[arg(long, value_name = "FILE", help = "Write each submitted report as JSON")]
    json_report: Option<PathBuf>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::load()?;
    let exams = ExamCategory::all();

    if cli.list_exams {
        print_exams(&exams);
        return Ok(());
    }

    let _log_guard = init_logging(Path::new(&config.log_dir))?;

    let start_index = match &cli.exam {
        Some(id) => match exams.iter().position(|e| &e.id == id) {
            Some(i) => Some(i),
            None => bail!("unknown exam '{id}', try --list-exams"),
        },
        None => None,
    };

    let theme_name = cli.theme.clone().unwrap_or_else(|| config.theme.clone());
    let theme = Theme::load(&theme_name).unwrap_or_default();
    let theme: &'static Theme = Box::leak(Box::new(theme));

    let options = Options {
        passage_file: cli.passage_file,
        duration_override: cli.duration,
        mode_override: cli.mode,
        json_report: cli.json_report,
    };
    let mut app = App::new(config, theme, exams, options);
    if let Some(i) = start_index {
        app.start_exam(i)?;
    }
    info!(theme = %theme.name, "starting");

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let events = EventHandler::new(Duration::from_millis(100));

    let result = run_app(&mut terminal, &mut app, &events);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = result {
        error!(error = %format!("{err:#}"), "exited with error");
        eprintln!("Error: {err:?}");
    }

    Ok(())
}

fn init_logging(log_dir: &Path) -> Result<WorkerGuard> {
    fs::create_dir_all(log_dir)
        .with_context(|| format!("creating log dir {}", log_dir.display()))?;
    let file_appender = tracing_appender::rolling::never(log_dir, "examtyper.log");
    let (nb_writer, guard) = tracing_appender::non_blocking(file_appender);
    let filter = EnvFilter::try_from_env("EXAMTYPER_LOG").unwrap_or_else(|_| EnvFilter::new("info"));
    // The terminal belongs to the TUI, so everything goes to the file.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_writer(nb_writer)
        .try_init();
    Ok(guard)
}

fn print_exams(exams: &[ExamCategory]) {
    for exam in exams {
        let p = &exam.policy;
        println!(
            "{:<24} {:<24} {:>4}s  {:>2} WPM  {:>3}%  {}",
            exam.id,
            exam.name,
            exam.duration_secs,
            p.min_gross_speed,
            p.min_accuracy,
            exam.mode
        );
    }
    if let Some(dir) = user_exams_dir() {
        println!("\nCustom categories: {}", dir.display());
    }
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    events: &EventHandler,
) -> Result<()> {
    loop {
        terminal.draw(|frame| render(frame, app))?;

        match events.next()? {
            AppEvent::Key(key) => handle_key(app, key),
            AppEvent::Second => app.on_second(),
            AppEvent::Tick | AppEvent::Resize(_, _) => {}
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

fn handle_key(app: &mut App, key: KeyEvent) {
    if key.kind != KeyEventKind::Press {
        return;
    }

    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        app.should_quit = true;
        return;
    }

    match app.screen {
        AppScreen::Menu => handle_menu_key(app, key),
        AppScreen::Test => handle_test_key(app, key),
        AppScreen::Result => handle_result_key(app, key),
    }
}

fn handle_menu_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => app.should_quit = true,
        KeyCode::Up | KeyCode::Char('k') => app.menu.prev(),
        KeyCode::Down | KeyCode::Char('j') => app.menu.next(),
        KeyCode::Char('m') => app.menu.cycle_mode(),
        KeyCode::Enter => app.start_selected(),
        KeyCode::Char(ch) => {
            if let Some(i) = app.menu.index_for_key(ch) {
                app.menu.selected = i;
                app.start_selected();
            }
        }
        _ => {}
    }
}

fn handle_test_key(app: &mut App, key: KeyEvent) {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::Char('s') if ctrl => app.submit(),
        KeyCode::Tab => app.toggle_pause(),
        KeyCode::Esc => app.escape_test(),
        KeyCode::Backspace => app.backspace(),
        KeyCode::Char(ch) if !ctrl => app.type_char(ch),
        _ => {}
    }
}

fn handle_result_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('r') => app.retry(),
        KeyCode::Char('n') => app.new_passage(),
        KeyCode::Esc | KeyCode::Char('m') => app.go_to_menu(),
        KeyCode::Char('q') => app.should_quit = true,
        _ => {}
    }
}

fn render(frame: &mut ratatui::Frame, app: &App) {
    let area = frame.area();
    let colors = &app.theme.colors;

    let bg = Block::default().style(Style::default().bg(colors.bg()));
    frame.render_widget(bg, area);

    match app.screen {
        AppScreen::Menu => render_menu(frame, app),
        AppScreen::Test => render_test(frame, app),
        AppScreen::Result => render_result(frame, app),
    }
}

fn render_status(frame: &mut ratatui::Frame, app: &App, area: ratatui::layout::Rect) {
    if let Some(status) = &app.status {
        let line = Line::from(Span::styled(
            format!("  {status}"),
            Style::default().fg(app.theme.colors.warning()),
        ));
        frame.render_widget(Paragraph::new(line), area);
    }
}

fn render_menu(frame: &mut ratatui::Frame, app: &App) {
    let area = frame.area();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(1)])
        .split(area);
    let menu_area = centered_rect(70, 90, chunks[0]);
    frame.render_widget(&app.menu, menu_area);
    render_status(frame, app, chunks[1]);
}

fn render_test(frame: &mut ratatui::Frame, app: &App) {
    let Some(session) = app.session.as_ref() else {
        return;
    };
    let Some(policy) = app.policy() else {
        return;
    };
    let colors = &app.theme.colors;
    let layout = TestLayout::new(frame.area());

    let snapshot = session.snapshot();
    let hide_accuracy =
        session.mode() == TypingMode::PaperTyping && session.state() != SessionState::Submitted;

    let mut header = vec![
        Span::styled(
            format!(" {} ", session.exam()),
            Style::default()
                .fg(colors.header_fg())
                .bg(colors.header_bg())
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!("  {}", session.mode().label()),
            Style::default().fg(colors.accent()),
        ),
    ];
    if session.state() == SessionState::Paused {
        header.push(Span::styled("  PAUSED", Style::default().fg(colors.warning())));
    }
    if layout.sidebar.is_none() {
        header.push(Span::styled(
            format!("  {}", compact_stats(&snapshot, session.remaining_secs(), hide_accuracy)),
            Style::default().fg(colors.fg()),
        ));
    }
    frame.render_widget(
        Paragraph::new(Line::from(header)).block(Block::bordered().border_style(Style::default().fg(colors.border()))),
        layout.header,
    );

    let typed = session.typed_text();
    frame.render_widget(
        TypingArea::new(
            session.tokens().expected(),
            session.visible_diff(),
            &session.passage().title,
            app.theme,
        ),
        layout.passage,
    );
    frame.render_widget(
        TypedText::new(&typed, session.state() != SessionState::Paused, app.theme),
        layout.typed,
    );

    if let Some(sidebar) = layout.sidebar {
        frame.render_widget(
            StatsSidebar::new(
                &snapshot,
                policy,
                session.remaining_secs(),
                session.idle_secs(),
                session.state(),
                hide_accuracy,
                app.theme,
            ),
            sidebar,
        );
    }

    if let Some(countdown) = layout.countdown {
        frame.render_widget(
            ProgressBar::countdown(session.remaining_secs(), session.time_progress(), app.theme),
            countdown,
        );
    }

    if app.status.is_some() {
        render_status(frame, app, layout.footer);
    } else {
        let idle_hint = if session.state() == SessionState::Idle {
            "Start typing to begin"
        } else {
            ""
        };
        let hints = pack_hint_lines(
            &[idle_hint, "[Tab] Pause/Resume", "[Ctrl-S] Submit", "[Esc] Restart/Menu", "[Ctrl-C] Quit"],
            layout.footer.width as usize,
        );
        let lines: Vec<Line> = hints
            .into_iter()
            .map(|h| Line::from(Span::styled(h, Style::default().fg(colors.text_pending()))))
            .collect();
        frame.render_widget(Paragraph::new(lines), layout.footer);
    }
}

fn render_result(frame: &mut ratatui::Frame, app: &App) {
    let area = frame.area();
    let (Some(report), Some(policy)) = (app.report(), app.policy()) else {
        let msg = Paragraph::new("No result yet.").alignment(Alignment::Center);
        frame.render_widget(msg, area);
        return;
    };
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(1)])
        .split(area);
    frame.render_widget(
        Dashboard::new(report, policy, app.theme),
        centered_rect(80, 90, chunks[0]),
    );
    render_status(frame, app, chunks[1]);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_duration_is_rejected() {
        assert!(Cli::try_parse_from(["examtyper", "--duration", "0"]).is_err());
        let cli = Cli::try_parse_from(["examtyper", "-d", "90", "-m", "paper"]).unwrap();
        assert_eq!(cli.duration, Some(90));
        assert_eq!(cli.mode, Some(TypingMode::PaperTyping));
    }
}
