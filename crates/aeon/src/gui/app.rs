use crate::config;
use crate::events::AppEvent;
use crate::gui::dial;
use crate::gui::theme::{self, ThemeColors};
use gtk::prelude::*;
use gtk4 as gtk;
use orrery::{Category, CategoryId, DialEngine, Notice, Point, PointerEvent, Viewport};
use relm4::prelude::*;
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;

const TITLE: &str = "Aeon";

pub struct AppModel {
    pub engine: Rc<RefCell<DialEngine>>,
    pub title: String,
    pub drawing_area: gtk::DrawingArea,
    tick: Option<gtk::TickCallbackId>,
}

#[derive(Debug)]
pub enum AppMsg {
    Pointer(PointerEvent),
    Resized(i32, i32),
    Select(CategoryId),
    Close,
    ConfigReload,
    Catalog(Vec<Category>),
    Notice(Notice),
}

impl From<AppEvent> for AppMsg {
    fn from(event: AppEvent) -> Self {
        match event {
            AppEvent::Select(id) => AppMsg::Select(id),
            AppEvent::Close => AppMsg::Close,
            AppEvent::ConfigReload => AppMsg::ConfigReload,
            AppEvent::CatalogLoaded(ages) => AppMsg::Catalog(ages),
        }
    }
}

impl AppModel {
    fn on_notice(&mut self, notice: Notice) {
        match notice {
            Notice::Selected(id) => {
                let engine = self.engine.borrow();
                let label = engine
                    .categories()
                    .iter()
                    .find(|c| c.id == id)
                    .map(Category::label)
                    .unwrap_or_else(|| id.to_string());
                log::info!("Selected age '{}'", id);
                self.title = format!("{TITLE} · {label}");
            }
            Notice::Closed => {
                log::info!("Closed expanded age");
                self.title = TITLE.to_string();
            }
            Notice::QualityChanged { adaptive, fps } => {
                log::info!("Adaptive quality {} at {:.1} fps", adaptive, fps);
            }
        }
    }
}

#[relm4::component(pub)]
impl SimpleComponent for AppModel {
    type Init = (DialEngine, async_channel::Receiver<AppEvent>);
    type Input = AppMsg;
    type Output = ();

    view! {
        #[root]
        #[name = "window"]
        gtk::ApplicationWindow {
            #[watch]
            set_title: Some(&model.title),
            set_default_size: (1280, 800),
            add_css_class: "aeon-window",

            add_controller = gtk::EventControllerKey {
                connect_key_pressed[sender] => move |_, key, _, _| {
                    if key == gtk::gdk::Key::Escape {
                        sender.input(AppMsg::Close);
                        return glib::Propagation::Stop;
                    }
                    glib::Propagation::Proceed
                }
            },

            #[name = "drawing_area"]
            gtk::DrawingArea {
                set_hexpand: true,
                set_vexpand: true,
                add_css_class: "aeon-dial",

                connect_resize[sender] => move |_, width, height| {
                    sender.input(AppMsg::Resized(width, height));
                },

                add_controller = gtk::EventControllerMotion {
                    connect_motion[sender] => move |_, x, y| {
                        sender.input(AppMsg::Pointer(PointerEvent::Moved(Point::new(x, y))));
                    },
                    connect_leave[sender] => move |_| {
                        sender.input(AppMsg::Pointer(PointerEvent::Left));
                    }
                },

                add_controller = gtk::GestureClick {
                    set_button: gtk::gdk::BUTTON_PRIMARY,
                    connect_released[sender] => move |_, _, x, y| {
                        sender.input(AppMsg::Pointer(PointerEvent::Released(Point::new(x, y))));
                    }
                }
            }
        }
    }

    fn init(
        init: Self::Init,
        root: Self::Root,
        sender: ComponentSender<Self>,
    ) -> ComponentParts<Self> {
        let (engine, rx) = init;

        theme::load_css();

        let engine = Rc::new(RefCell::new(engine));

        let model = AppModel {
            engine: engine.clone(),
            title: TITLE.to_string(),
            drawing_area: gtk::DrawingArea::default(),
            tick: None,
        };

        let widgets = view_output!();

        let mut model = model;
        model.drawing_area = widgets.drawing_area.clone();

        let engine_draw = engine.clone();
        widgets
            .drawing_area
            .set_draw_func(move |drawing_area, cr, _, _| {
                let style_context = drawing_area.style_context();
                let colors = ThemeColors::from_context(&style_context);
                if let Err(e) = dial::draw(cr, engine_draw.borrow().frame(), &colors) {
                    log::error!("Drawing error: {}", e);
                }
            });

        // Frame clock drives the engine; the callback is removed on shutdown.
        let last_frame = Cell::new(None::<i64>);
        let engine_tick = engine.clone();
        let tick_sender = sender.clone();
        model.tick = Some(
            widgets
                .drawing_area
                .add_tick_callback(move |drawing_area, clock| {
                    let now = clock.frame_time();
                    let elapsed = last_frame
                        .replace(Some(now))
                        .map_or(0, |prev| (now - prev).max(0));

                    let notices = {
                        let mut engine = engine_tick.borrow_mut();
                        engine.tick(Duration::from_micros(elapsed as u64));
                        engine.drain_notices()
                    };
                    for notice in notices {
                        tick_sender.input(AppMsg::Notice(notice));
                    }

                    drawing_area.queue_draw();
                    glib::ControlFlow::Continue
                }),
        );

        let sender_clone = sender.clone();
        relm4::spawn(async move {
            while let Ok(event) = rx.recv().await {
                sender_clone.input(AppMsg::from(event));
            }
        });

        ComponentParts { model, widgets }
    }

    fn update(&mut self, msg: Self::Input, _sender: ComponentSender<Self>) {
        match msg {
            AppMsg::Pointer(event) => self.engine.borrow_mut().push_pointer(event),
            AppMsg::Resized(width, height) => self
                .engine
                .borrow_mut()
                .resize(Viewport::new(width as f64, height as f64)),
            AppMsg::Select(id) => self.engine.borrow_mut().select(&id),
            AppMsg::Close => self.engine.borrow_mut().close(),
            AppMsg::Catalog(ages) => self.engine.borrow_mut().set_categories(ages),
            AppMsg::ConfigReload => match config::load_config() {
                Ok(new_config) => {
                    if let Err(e) = self.engine.borrow_mut().set_config(new_config.dial) {
                        log::error!("Rejected reloaded config: {}", e);
                    } else {
                        log::info!("Configuration reloaded");
                    }
                }
                Err(e) => log::error!("Failed to reload config: {}", e),
            },
            AppMsg::Notice(notice) => self.on_notice(notice),
        }
        self.drawing_area.queue_draw();
    }

    fn shutdown(&mut self, _widgets: &mut Self::Widgets, _output: relm4::Sender<Self::Output>) {
        if let Some(tick) = self.tick.take() {
            tick.remove();
        }
    }
}
