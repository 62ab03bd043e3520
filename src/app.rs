use std::io;

use chrono::{Local, NaiveDate};
use crossterm::event::{Event as TermEvent, EventStream, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use futures::StreamExt;
use ratatui::{
    backend::Backend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, List, ListItem, ListState, Paragraph, Wrap},
    Frame, Terminal,
};

use crate::cities::{self, TR_CITIES};
use crate::coordinator::Coordinator;
use crate::presenter::{self, format_temp, DayCard, View};
use crate::state::Event;

const TITLE: &str = "Hava Durumu";
const HELP: &str = " ↑/↓ şehir seç · Enter göster · q çıkış";

pub struct App {
    coordinator: Coordinator,
    cities: ListState,
    shown_city: String,
}

impl App {
    pub fn new(coordinator: Coordinator) -> Self {
        let mut app = Self {
            coordinator,
            cities: ListState::default(),
            shown_city: String::new(),
        };
        app.follow_city();
        app
    }

    pub fn coordinator(&self) -> &Coordinator {
        &self.coordinator
    }

    /// Move the cursor onto the current city whenever the coordinator renames it.
    fn follow_city(&mut self) {
        let city = self.coordinator.state().city_name();
        if city == self.shown_city {
            return;
        }
        self.shown_city = city.to_string();
        if let Some(i) = cities::position(city) {
            self.cities.select(Some(i));
        } else if self.cities.selected().is_none() {
            self.cities.select(Some(0));
        }
    }

    fn dispatch(&mut self, event: Event) {
        self.coordinator.dispatch(event);
        self.follow_city();
    }

    fn choose_highlighted(&mut self) {
        // The list is disabled while a lookup is running.
        if self.coordinator.state().loading() {
            return;
        }
        if let Some(city) = self.cities.selected().and_then(|i| TR_CITIES.get(i)) {
            self.dispatch(Event::CitySelected(city.to_string()));
        }
    }

    /// Handle a key press. Returns false when the user wants out.
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        if key.kind != KeyEventKind::Press {
            return true;
        }
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => return false,
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => return false,
            KeyCode::Up | KeyCode::Char('k') => self.cities.select_previous(),
            KeyCode::Down | KeyCode::Char('j') => {
                // Clamp here, the list does not know its length until rendered.
                let next = self.cities.selected().map_or(0, |i| i + 1);
                self.cities.select(Some(next.min(TR_CITIES.len() - 1)));
            }
            KeyCode::Home => self.cities.select_first(),
            KeyCode::End => self.cities.select(Some(TR_CITIES.len() - 1)),
            KeyCode::Enter => self.choose_highlighted(),
            _ => {}
        }
        true
    }
}

pub async fn run_app<B: Backend>(terminal: &mut Terminal<B>, mut app: App) -> io::Result<()> {
    app.dispatch(Event::Started);
    let mut input = EventStream::new();
    loop {
        terminal.draw(|f| ui(f, &mut app, Local::now().date_naive()))?;

        tokio::select! {
            Some(event) = app.coordinator.next_event() => app.dispatch(event),
            term_event = input.next() => match term_event {
                Some(Ok(TermEvent::Key(key))) => {
                    if !app.handle_key(key) {
                        return Ok(());
                    }
                }
                Some(Ok(_)) => {}
                Some(Err(e)) => return Err(e),
                None => return Ok(()),
            },
        }
    }
}

fn bordered<'a>(title: &'a str) -> Block<'a> {
    Block::default()
        .borders(Borders::ALL)
        .title(Span::styled(title, Style::default().fg(Color::Yellow)))
        .title_alignment(Alignment::Left)
        .border_style(Style::default().fg(Color::Cyan))
        .border_type(BorderType::Rounded)
}

fn display_headline(app: &App) -> Paragraph<'_> {
    let state = app.coordinator.state();
    let position = match state.coordinates() {
        Some(c) => format!("{:.2}, {:.2}", c.latitude, c.longitude),
        None => presenter::MISSING.to_string(),
    };
    Paragraph::new(vec![Line::from(vec![
        Span::raw(" "),
        Span::styled(
            TITLE,
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        ),
        Span::raw(" : "),
        Span::styled(state.city_name().to_string(), Style::default().fg(Color::Green)),
        Span::raw("  "),
        Span::styled(position, Style::default().fg(Color::Blue)),
    ])])
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan))
            .border_type(BorderType::Rounded),
    )
}

fn display_cities(loading: bool) -> List<'static> {
    let items: Vec<ListItem> = TR_CITIES.iter().map(|c| ListItem::new(*c)).collect();
    let style = if loading {
        Style::default().fg(Color::DarkGray)
    } else {
        Style::default()
    };
    List::new(items)
        .block(bordered(" Şehir "))
        .style(style)
        .highlight_style(Style::default().fg(Color::Black).bg(Color::Yellow))
        .highlight_symbol("> ")
}

fn display_day(card: &DayCard) -> Vec<Line<'static>> {
    let name_style = if card.is_today {
        Style::default()
            .fg(Color::Black)
            .bg(Color::Yellow)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
    };
    let mut name = vec![
        Span::raw(" "),
        Span::styled(card.day_name, name_style),
        Span::raw(format!(" {}", card.date.format("%d.%m"))),
    ];
    if card.is_today {
        name.push(Span::styled(" (bugün)", Style::default().fg(Color::Yellow)));
    }

    vec![
        Line::from(""),
        Line::from(name),
        Line::from(vec![
            Span::raw(format!(" {} ", card.condition.icon)),
            Span::styled(card.condition.label, Style::default().fg(Color::Green)),
        ]),
        Line::from(vec![
            Span::raw(" "),
            Span::styled(format_temp(card.temp_max), Style::default().fg(Color::Red)),
            Span::raw(" / "),
            Span::styled(format_temp(card.temp_min), Style::default().fg(Color::Blue)),
        ]),
    ]
}

fn render_forecast(f: &mut Frame, area: Rect, app: &App, today: NaiveDate) {
    let block = bordered(" Tahmin ");
    let message = |text: &str, color: Color| {
        Paragraph::new(vec![
            Line::from(""),
            Line::from(Span::styled(text.to_string(), Style::default().fg(color))),
        ])
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .block(bordered(" Tahmin "))
    };

    match presenter::view(app.coordinator.state(), today) {
        View::Loading => f.render_widget(message(presenter::LOADING, Color::Gray), area),
        View::Error(error) => f.render_widget(message(error, Color::Red), area),
        View::Empty => f.render_widget(message(presenter::EMPTY, Color::Gray), area),
        View::Days(cards) => {
            let items: Vec<ListItem> = cards.iter().map(|c| ListItem::new(display_day(c))).collect();
            f.render_widget(List::new(items).block(block), area);
        }
    }
}

fn ui(f: &mut Frame, app: &mut App, today: NaiveDate) {
    let vert_layout = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(f.area());

    f.render_widget(display_headline(app), vert_layout[0]);

    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(24), Constraint::Min(0)])
        .split(vert_layout[1]);

    let cities = display_cities(app.coordinator.state().loading());
    f.render_stateful_widget(cities, chunks[0], &mut app.cities);

    render_forecast(f, chunks[1], app, today);

    f.render_widget(
        Paragraph::new(Span::styled(HELP, Style::default().fg(Color::DarkGray))),
        vert_layout[2],
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::location::Unavailable;
    use crate::open_meteo::{forecast::ForecastClient, geocoding::GeocodingClient};
    use crate::state::WeatherState;
    use ratatui::backend::TestBackend;
    use std::sync::Arc;

    fn app(city: &str) -> App {
        let client = reqwest::Client::new();
        // Nothing listens here; requests fail fast if a test ever sends one.
        let geocoder = GeocodingClient::new(client.clone(), "http://127.0.0.1:9");
        let forecaster = ForecastClient::new(client, "http://127.0.0.1:9/v1/forecast");
        App::new(Coordinator::new(
            WeatherState::new(city),
            Arc::new(geocoder),
            Arc::new(forecaster),
            Arc::new(Unavailable),
        ))
    }

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn screen(app: &mut App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(80, 30)).unwrap();
        let today = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        terminal.draw(|f| ui(f, app, today)).unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    #[tokio::test]
    async fn cursor_starts_on_current_city() {
        let app = app("İzmir");
        assert_eq!(app.cities.selected(), cities::position("İzmir"));
    }

    #[tokio::test]
    async fn quit_keys() {
        let mut app = app("Ankara");
        assert!(app.handle_key(press(KeyCode::Down)));
        assert!(!app.handle_key(press(KeyCode::Char('q'))));
        assert!(!app.handle_key(press(KeyCode::Esc)));
        assert!(!app.handle_key(KeyEvent::new(
            KeyCode::Char('c'),
            KeyModifiers::CONTROL
        )));
    }

    #[tokio::test]
    async fn cursor_stays_in_list() {
        let mut app = app("Zonguldak");
        app.handle_key(press(KeyCode::Down));
        assert_eq!(app.cities.selected(), Some(TR_CITIES.len() - 1));
        app.handle_key(press(KeyCode::Home));
        assert_eq!(app.cities.selected(), Some(0));
    }

    #[tokio::test]
    async fn enter_selects_highlighted_city() {
        let mut app = app("Adana");
        app.handle_key(press(KeyCode::Down));
        app.handle_key(press(KeyCode::Enter));
        assert_eq!(app.coordinator().state().city_name(), "Adıyaman");
        assert!(app.coordinator().state().loading());

        // Ignored while the lookup runs.
        app.handle_key(press(KeyCode::Down));
        app.handle_key(press(KeyCode::Enter));
        assert_eq!(app.coordinator().state().city_name(), "Adıyaman");
    }

    #[tokio::test]
    async fn draws_title_and_empty_state() {
        let mut app = app("Ankara");
        let text = screen(&mut app);
        assert!(text.contains(TITLE));
        assert!(text.contains("Ankara"));
        assert!(text.contains(presenter::EMPTY));
    }
}
