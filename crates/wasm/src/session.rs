use std::cell::RefCell;
use std::rc::Rc;

use nox_core::session::{
    INVALID_MESSAGE, KeyValueStore, LoginError, SessionManager, StoreError, WELCOME_MESSAGE,
};
use wasm_bindgen::prelude::*;
use web_sys::{Document, FormData, HtmlElement, HtmlFormElement, Storage, Window};

use crate::dom;

const FORM_ID: &str = "loginForm";
const LOGOUT_ID: &str = "logoutBtn";
const STATUS_ID: &str = "sessionStatus";

/// `window.localStorage`. Private browsing modes may deny access, in which
/// case every operation reports [`StoreError::Unavailable`].
pub struct LocalStore {
    storage: Option<Storage>,
}

impl LocalStore {
    pub fn new(window: &Window) -> Self {
        Self {
            storage: window.local_storage().ok().flatten(),
        }
    }

    fn storage(&self) -> Result<&Storage, StoreError> {
        self.storage
            .as_ref()
            .ok_or_else(|| StoreError::Unavailable("localStorage is not accessible".into()))
    }
}

fn store_error(err: JsValue) -> StoreError {
    StoreError::Unavailable(format!("{err:?}"))
}

impl KeyValueStore for LocalStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.storage()?.get_item(key).map_err(store_error)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.storage()?.set_item(key, value).map_err(store_error)
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        self.storage()?.remove_item(key).map_err(store_error)
    }
}

/// The status line and logout button.
#[derive(Clone)]
struct SessionView {
    status: Option<HtmlElement>,
    logout: Option<HtmlElement>,
}

impl SessionView {
    fn say(&self, message: &str) {
        if let Some(status) = &self.status {
            status.set_text_content(Some(message));
        }
    }

    fn refresh(&self, manager: &SessionManager<LocalStore>) {
        let status = manager.status();
        self.say(&status.message);
        if let Some(logout) = &self.logout {
            logout.set_hidden(!status.logout_visible);
        }
    }
}

fn field(data: &FormData, name: &str) -> String {
    data.get(name).as_string().unwrap_or_default()
}

pub type SharedSession = Rc<RefCell<SessionManager<LocalStore>>>;

/// Hook the login form and logout button, then show the stored session.
pub fn mount(window: &Window, document: &Document) -> Result<SharedSession, JsValue> {
    let manager = Rc::new(RefCell::new(SessionManager::new(LocalStore::new(window))));
    let view = SessionView {
        status: dom::by_id(document, STATUS_ID),
        logout: dom::by_id(document, LOGOUT_ID),
    };

    if let Some(form) = dom::by_id::<HtmlFormElement>(document, FORM_ID) {
        let manager = Rc::clone(&manager);
        let view = view.clone();
        let target = form.clone();
        dom::listen(&form, "submit", move |event| {
            event.prevent_default();
            let data = match FormData::new_with_form(&target) {
                Ok(data) => data,
                Err(e) => return dom::report(&e),
            };
            let email = field(&data, "email");
            let password = field(&data, "password");
            let now_ms = js_sys::Date::now() as i64;
            let mut manager = manager.borrow_mut();
            match manager.login(&email, &password, now_ms) {
                Ok(_) => {
                    view.refresh(&manager);
                    view.say(WELCOME_MESSAGE);
                }
                Err(LoginError::InvalidCredentials) => view.say(INVALID_MESSAGE),
                Err(e) => dom::report(&JsValue::from_str(&e.to_string())),
            }
        })?;
    }

    if let Some(logout) = view.logout.clone() {
        let manager = Rc::clone(&manager);
        let view = view.clone();
        dom::listen(&logout, "click", move |_| {
            let mut manager = manager.borrow_mut();
            if let Err(e) = manager.logout() {
                dom::report(&JsValue::from_str(&e.to_string()));
            }
            view.refresh(&manager);
        })?;
    }

    view.refresh(&manager.borrow());
    Ok(manager)
}
