use nox_core::palette::{mix_hex as mix, palette_from_rgba as extract};
use nox_core::session::validate;
use nox_core::{NoxConfig, PaletteConfig};
use wasm_bindgen::prelude::*;

mod dom;
mod logo;
mod nav;
mod session;
mod starfield;

pub use starfield::{CanvasSurface, RafScheduler, Starfield};

/// Everything the page wired up. Dropping it does not unhook listeners;
/// keep it alive for the page's lifetime.
#[wasm_bindgen]
pub struct NoxPage {
    starfield: Option<Starfield>,
    menu: Option<nav::SharedMenu>,
    curiosities: Option<nav::SharedGrid>,
    publisher: logo::SharedPublisher,
    session: session::SharedSession,
}

#[wasm_bindgen]
impl NoxPage {
    /// Stop the background animation and cancel its pending frame.
    pub fn stop_starfield(&self) {
        if let Some(starfield) = &self.starfield {
            starfield.stop();
        }
    }

    #[wasm_bindgen(getter)]
    pub fn menu_open(&self) -> bool {
        self.menu.as_ref().is_some_and(|m| m.borrow().is_open())
    }

    /// How many curiosity answers have been revealed.
    #[wasm_bindgen(getter)]
    pub fn revealed(&self) -> usize {
        self.curiosities.as_ref().map_or(0, |grid| {
            let grid = grid.borrow();
            (0..grid.len()).filter(|&i| grid.is_revealed(i)).count()
        })
    }

    #[wasm_bindgen(getter)]
    pub fn animating(&self) -> bool {
        self.starfield.as_ref().is_some_and(Starfield::is_running)
    }

    /// The applied theme as JSON, or `undefined` before any logo was used.
    pub fn theme(&self) -> Result<Option<String>, JsError> {
        self.publisher
            .borrow()
            .current()
            .map(|t| serde_json::to_string(t).map_err(|e| JsError::new(&e.to_string())))
            .transpose()
    }

    /// The stored session as JSON, or `undefined` when logged out.
    pub fn session(&self) -> Result<Option<String>, JsError> {
        self.session
            .borrow()
            .current()
            .map(|s| serde_json::to_string(&s).map_err(|e| JsError::new(&e.to_string())))
            .transpose()
    }
}

fn js_error(err: JsValue) -> JsError {
    JsError::new(&err.as_string().unwrap_or_else(|| format!("{err:?}")))
}

/// Wire every page feature. `config_json` overrides defaults (same shape as
/// `NoxConfig`); omitted fields keep their defaults.
#[wasm_bindgen]
pub fn mount(config_json: Option<String>) -> Result<NoxPage, JsError> {
    console_error_panic_hook::set_once();

    let config = match config_json {
        Some(text) => NoxConfig::from_json(&text).map_err(|e| JsError::new(&e.to_string()))?,
        None => NoxConfig::default(),
    };
    let window = dom::window().map_err(js_error)?;
    let document = dom::document(&window).map_err(js_error)?;

    let starfield = Starfield::mount(&window, &document, config.starfield).map_err(js_error)?;
    if starfield.is_none() {
        dom::warn("no #starfield canvas; background disabled");
    }

    let menu = nav::mount_menu(&document).map_err(js_error)?;
    let curiosities = nav::mount_curiosities(&document).map_err(js_error)?;

    let publisher = logo::publisher(&document, config.palette).map_err(js_error)?;
    logo::mount(&document, &publisher).map_err(js_error)?;

    let session = session::mount(&window, &document).map_err(js_error)?;
    nav::stamp_year(&document);

    Ok(NoxPage {
        starfield,
        menu,
        curiosities,
        publisher,
        session,
    })
}

/// Mix two hex colors, e.g. `mix_hex("#ff0000", "#000000", 0.7)`.
#[wasm_bindgen]
pub fn mix_hex(a: &str, b: &str, ratio: f64) -> Result<String, JsError> {
    mix(a, b, ratio).map_err(|e| JsError::new(&e.to_string()))
}

/// Palette of raw RGBA bytes (as from `getImageData`) as JSON
/// `{"primary":"#rrggbb","accent":"#rrggbb"}`, or `undefined` if every
/// sample is transparent.
#[wasm_bindgen]
pub fn palette_from_rgba(data: &[u8]) -> Result<Option<String>, JsError> {
    extract(data, &PaletteConfig::default())
        .map(|p| serde_json::to_string(&p).map_err(|e| JsError::new(&e.to_string())))
        .transpose()
}

/// Whether the login form would accept these credentials.
#[wasm_bindgen]
pub fn credentials_valid(email: &str, password: &str) -> bool {
    validate(email, password).is_ok()
}
