use std::io;
use std::time::{Duration, Instant};

use clap::Parser;
use crossterm::event::{Event, KeyCode, KeyModifiers};
use indoc::indoc;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::widgets::Paragraph;
use tracing::{Level, info};

use term_overlay::components::surface::render_trigger;
use term_overlay::components::{Component, Dropdown, Popconfirm, Popover, Select, Tooltip};
use term_overlay::document::{Document, ElementId};
use term_overlay::drivers::console::{ConsoleInputDriver, ConsoleOutputDriver};
use term_overlay::drivers::{InputDriver, OutputDriver};
use term_overlay::event_loop::{ControlFlow, EventLoop};
use term_overlay::layout::FloatRect;
use term_overlay::log_buffer::{LogBuffer, set_global_log_buffer};
use term_overlay::navigation::MenuItem;
use term_overlay::overlay::{OverlayConfig, TriggerMode};
use term_overlay::placement::Placement;
use term_overlay::{theme, tracing_sub};

const TRIGGER_WIDTH: u16 = 14;

#[derive(Parser, Debug)]
#[command(
    name = "term-overlay",
    version = env!("CARGO_PKG_VERSION"),
    about = "Gallery of floating overlays: dropdown, select, popover, tooltip, popconfirm",
    after_help = indoc! {"
        The placement flags configure the popover in the middle of the screen.
        Move it around by resizing the terminal to watch flip and shift at work.

        Keys: Tab cycles trigger focus, Enter/Space/Down opens, Esc dismisses,
        q quits.
    "}
)]
struct DemoCli {
    /// Preferred placement, e.g. `bottom-start` or `right`.
    #[arg(short = 'p', long, value_name = "PLACEMENT", default_value = "bottom")]
    placement: Placement,

    /// Placements tried in order when the preferred one overflows.
    #[arg(long = "fallback", value_name = "PLACEMENT", value_delimiter = ',')]
    fallbacks: Vec<Placement>,

    /// `click` or `hover`.
    #[arg(short = 't', long, value_name = "MODE", default_value = "click")]
    trigger: TriggerMode,

    /// Gap between trigger and panel, in cells.
    #[arg(long, value_name = "CELLS", default_value_t = 1)]
    offset: i32,

    /// Distance kept from the terminal edges.
    #[arg(long, value_name = "CELLS", default_value_t = 1)]
    padding: u16,

    /// Draw an arrow pointing at the trigger.
    #[arg(long)]
    arrow: bool,

    /// Most verbose level written to the on-screen log line.
    #[arg(long, value_name = "LEVEL", default_value = "debug")]
    log_level: Level,
}

impl DemoCli {
    fn overlay_config(&self) -> Result<OverlayConfig, String> {
        if !(0..=8).contains(&self.offset) {
            return Err("offset must be between 0 and 8 cells".to_string());
        }
        let mut config = OverlayConfig::new(self.placement)
            .with_trigger_mode(self.trigger)
            .with_offset(self.offset)
            .with_collision_padding(self.padding)
            .with_arrow(self.arrow);
        if !self.fallbacks.is_empty() {
            config = config.with_fallback_placements(self.fallbacks.clone());
        }
        Ok(config)
    }
}

struct Triggers {
    dropdown: ElementId,
    select: ElementId,
    popover: ElementId,
    tooltip: ElementId,
    confirm: ElementId,
}

impl Triggers {
    fn create(doc: &mut Document) -> Self {
        let mut make = || doc.append(None, FloatRect::new(0, 0, TRIGGER_WIDTH, 1));
        Self {
            dropdown: make(),
            select: make(),
            popover: make(),
            tooltip: make(),
            confirm: make(),
        }
    }

    fn focus_order(&self) -> [ElementId; 5] {
        [
            self.dropdown,
            self.select,
            self.popover,
            self.tooltip,
            self.confirm,
        ]
    }

    /// Spread triggers over the viewport: two on top, one centred, two near
    /// the bottom so flipping shows up without resizing.
    fn layout(&self, doc: &mut Document) {
        let vp = FloatRect::from(doc.viewport());
        let w = TRIGGER_WIDTH as i32;
        let bottom = (vp.bottom() - 4).max(2);
        doc.set_rect(self.dropdown, FloatRect::new(2, 2, TRIGGER_WIDTH, 1));
        doc.set_rect(self.select, FloatRect::new(4 + w, 2, TRIGGER_WIDTH, 1));
        doc.set_rect(
            self.popover,
            FloatRect::new(vp.center_x() - w / 2, vp.center_y(), TRIGGER_WIDTH, 1),
        );
        doc.set_rect(self.tooltip, FloatRect::new(2, bottom, TRIGGER_WIDTH, 1));
        doc.set_rect(
            self.confirm,
            FloatRect::new((vp.right() - w - 2).max(0), bottom, TRIGGER_WIDTH, 1),
        );
    }
}

struct Gallery {
    doc: Document,
    triggers: Triggers,
    components: Vec<(&'static str, Box<dyn Component>)>,
    log: LogBuffer,
}

impl Gallery {
    fn new(viewport: Rect, popover_config: OverlayConfig, log: LogBuffer) -> Self {
        let mut doc = Document::new(viewport);
        let triggers = Triggers::create(&mut doc);
        triggers.layout(&mut doc);

        let dropdown = Dropdown::new(
            &mut doc,
            triggers.dropdown,
            "File",
            vec![
                MenuItem::labeled("New"),
                MenuItem::labeled("Open…"),
                MenuItem::labeled("Save").disabled(true),
                MenuItem::labeled("Quit"),
            ],
        );
        let select = Select::new(
            &mut doc,
            triggers.select,
            "Colour",
            vec![
                MenuItem::new("red", "Red"),
                MenuItem::new("green", "Green"),
                MenuItem::new("blue", "Blue"),
            ],
        );
        let popover = Popover::new(
            &mut doc,
            triggers.popover,
            "Popover",
            "Positioned by the overlay controller. Click outside or press Esc.",
            popover_config,
        );
        let tooltip = Tooltip::new(&mut doc, triggers.tooltip, "Hover hint");
        let confirm = Popconfirm::new(&mut doc, triggers.confirm, "Really delete?");

        Self {
            doc,
            triggers,
            components: vec![
                ("dropdown", Box::new(dropdown)),
                ("select", Box::new(select)),
                ("popover", Box::new(popover)),
                ("tooltip", Box::new(tooltip)),
                ("popconfirm", Box::new(confirm)),
            ],
            log,
        }
    }

    fn handle_event(&mut self, event: &Event) -> ControlFlow {
        self.doc.dispatch(event);
        if let Event::Resize(..) = event {
            self.triggers.layout(&mut self.doc);
        }
        let handled = self
            .components
            .iter_mut()
            .any(|(_, component)| component.handle_event(&mut self.doc, event));
        if !handled && let Event::Key(key) = event {
            match key.code {
                KeyCode::Char('q') => return ControlFlow::Quit,
                KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                    return ControlFlow::Quit;
                }
                KeyCode::Tab => self.cycle_focus(1),
                KeyCode::BackTab => self.cycle_focus(-1),
                _ => {}
            }
        }
        self.pump();
        ControlFlow::Continue
    }

    fn cycle_focus(&mut self, step: isize) {
        let order = self.triggers.focus_order();
        let current = self
            .doc
            .focused()
            .and_then(|id| order.iter().position(|t| *t == id));
        let len = order.len() as isize;
        let next = match current {
            Some(pos) => (pos as isize + step).rem_euclid(len),
            None if step < 0 => len - 1,
            None => 0,
        };
        self.doc.focus(order[next as usize]);
    }

    fn pump(&mut self) {
        let now = Instant::now();
        for (name, component) in self.components.iter_mut() {
            component.pump(&mut self.doc, now);
            for event in component.take_events() {
                info!(component = *name, ?event, "overlay event");
            }
        }
    }

    fn render(&mut self, mut frame: term_overlay::ui::UiFrame<'_>) {
        let area = frame.area();
        let header = Paragraph::new("Tab: focus · Enter: open · Esc: dismiss · q: quit")
            .style(Style::default().fg(theme::accent()));
        frame.render_widget(header, Rect { height: 1, ..area });

        render_trigger(&mut frame, &self.doc, self.triggers.popover, "Popover ▸");
        render_trigger(&mut frame, &self.doc, self.triggers.tooltip, "Hover me");
        render_trigger(&mut frame, &self.doc, self.triggers.confirm, "Delete…");
        for (_, component) in self.components.iter_mut() {
            component.render(&mut frame, &self.doc);
        }

        if area.height > 1 {
            let last = self.log.tail(1).pop().unwrap_or_default();
            let line = Rect {
                y: area.bottom() - 1,
                height: 1,
                ..area
            };
            frame.render_widget(
                Paragraph::new(last).style(Style::default().fg(theme::dialog_separator())),
                line,
            );
        }
    }

    fn dispose(&mut self) {
        for (_, component) in self.components.iter_mut() {
            component.dispose(&mut self.doc);
        }
    }
}

fn main() -> io::Result<()> {
    let args = DemoCli::parse();
    let config = args
        .overlay_config()
        .map_err(|msg| io::Error::new(io::ErrorKind::InvalidInput, msg))?;

    let log = LogBuffer::default();
    set_global_log_buffer(log.clone());
    tracing_sub::init(args.log_level);

    let mut output = ConsoleOutputDriver::new()?;
    output.enter()?;
    let mut input = ConsoleInputDriver::new();
    input.set_mouse_capture(true)?;

    let mut gallery = Gallery::new(output.viewport()?, config, log);
    let mut event_loop = EventLoop::new(input, Duration::from_millis(16));
    let result = event_loop.run(|_, event| match event {
        Some(event) => Ok(gallery.handle_event(&event)),
        None => {
            gallery.pump();
            output.draw(|frame| gallery.render(frame))?;
            Ok(ControlFlow::Continue)
        }
    });

    gallery.dispose();
    output.exit()?;
    result
}
