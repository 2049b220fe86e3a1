//! Logo upload and the CSS custom properties derived from it.

use std::cell::RefCell;
use std::rc::Rc;

use nox_core::PaletteConfig;
use nox_core::palette::palette_from_rgba;
use nox_core::theme::{ThemePublisher, ThemeSink};
use nox_protocol::Theme;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{CssStyleDeclaration, Document, File, HtmlImageElement, HtmlInputElement, Url};

use crate::dom;
use crate::starfield::context_2d;

const INPUT_ID: &str = "logoInput";
const LOGO_ID: &str = "logo";

/// Writes variables onto `document.documentElement.style`.
pub struct StyleSink {
    style: CssStyleDeclaration,
}

impl ThemeSink for StyleSink {
    fn set_variable(&mut self, name: &str, value: &str) {
        if let Err(e) = self.style.set_property(name, value) {
            dom::report(&e);
        }
    }
}

pub type SharedPublisher = Rc<RefCell<ThemePublisher<StyleSink>>>;

pub fn publisher(document: &Document, config: PaletteConfig) -> Result<SharedPublisher, JsValue> {
    let root = document
        .document_element()
        .ok_or("document has no root element")?
        .dyn_into::<web_sys::HtmlElement>()?;
    let sink = StyleSink {
        style: root.style(),
    };
    Ok(Rc::new(RefCell::new(ThemePublisher::new(config, sink))))
}

/// Draw `img` onto an offscreen square canvas and return its RGBA bytes.
fn sample(document: &Document, img: &HtmlImageElement, side: u32) -> Result<Vec<u8>, JsValue> {
    let canvas = document
        .create_element("canvas")?
        .dyn_into::<web_sys::HtmlCanvasElement>()?;
    canvas.set_width(side);
    canvas.set_height(side);
    let ctx = context_2d(&canvas)?;
    let side = f64::from(side);
    ctx.draw_image_with_html_image_element_and_dw_and_dh(img, 0.0, 0.0, side, side)?;
    Ok(ctx.get_image_data(0.0, 0.0, side, side)?.data().0)
}

/// Extract a palette from a loaded image and publish it. A blank or
/// zero-sized image leaves the theme as it was.
pub fn theme_from_image(
    document: &Document,
    publisher: &SharedPublisher,
    img: &HtmlImageElement,
) -> Result<Option<Theme>, JsValue> {
    if img.natural_width() == 0 || img.natural_height() == 0 {
        return Ok(None);
    }
    let config = publisher.borrow().config().clone();
    let samples = sample(document, img, config.sample_size)?;
    let palette = palette_from_rgba(&samples, &config);
    Ok(publisher.borrow_mut().apply_extracted(palette))
}

fn publish_from(document: &Document, publisher: &SharedPublisher, img: &HtmlImageElement) {
    // Cross-origin images taint the canvas; getImageData then throws.
    if let Err(e) = theme_from_image(document, publisher, img) {
        dom::report(&e);
    }
}

fn load_file(
    document: &Document,
    publisher: &SharedPublisher,
    logo: Option<HtmlImageElement>,
    file: &File,
) -> Result<(), JsValue> {
    let url = Url::create_object_url_with_blob(file)?;
    let probe = HtmlImageElement::new()?;

    let document = document.clone();
    let publisher = Rc::clone(publisher);
    let loaded = probe.clone();
    let shown_url = url.clone();
    let onload: Closure<dyn FnMut()> = Closure::once(move || {
        publish_from(&document, &publisher, &loaded);
        if let Some(logo) = logo {
            logo.set_src(&shown_url);
            if let Ok(Some(brand)) = document.query_selector(".brand") {
                if let Err(e) = brand.class_list().remove_1("no-logo") {
                    dom::report(&e);
                }
            }
        }
    });
    probe.set_onload(Some(onload.as_ref().unchecked_ref()));
    onload.forget();
    probe.set_src(&url);
    Ok(())
}

/// Hook `#logoInput` and `#logo`. Missing elements are skipped.
pub fn mount(document: &Document, publisher: &SharedPublisher) -> Result<(), JsValue> {
    let logo = dom::by_id::<HtmlImageElement>(document, LOGO_ID);

    if let Some(input) = dom::by_id::<HtmlInputElement>(document, INPUT_ID) {
        let document = document.clone();
        let publisher = Rc::clone(publisher);
        let logo = logo.clone();
        let target = input.clone();
        dom::listen(&input, "change", move |_| {
            let Some(file) = target.files().and_then(|files| files.get(0)) else {
                return;
            };
            if let Err(e) = load_file(&document, &publisher, logo.clone(), &file) {
                dom::report(&e);
            }
        })?;
    }

    if let Some(logo) = logo {
        let document = document.clone();
        let publisher = Rc::clone(publisher);
        let img = logo.clone();
        dom::listen(&logo, "load", move |_| {
            publish_from(&document, &publisher, &img);
        })?;
    }
    Ok(())
}
