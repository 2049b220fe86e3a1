/// Class put on `<body>` while the radial menu is open.
pub const OPEN_CLASS: &str = "radial-open";

/// Open/closed state of the radial navigation menu.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RadialMenu {
    open: bool,
}

impl RadialMenu {
    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Value for the toggle button's `aria-expanded` attribute.
    pub fn aria_expanded(&self) -> &'static str {
        if self.open { "true" } else { "false" }
    }

    pub fn set_open(&mut self, open: bool) {
        self.open = open;
    }

    /// Toggle button pressed. Returns the new state.
    pub fn toggle(&mut self) -> bool {
        self.open = !self.open;
        self.open
    }

    /// A key went down anywhere on the page. Returns `true` if the key closed
    /// the menu (or would have, had it been open).
    pub fn on_key(&mut self, key: &str) -> bool {
        if key == "Escape" {
            self.open = false;
            return true;
        }
        false
    }

    /// A click landed on the page; `inside_nav` tells whether it hit the
    /// navigation itself.
    pub fn on_click(&mut self, inside_nav: bool) {
        if !inside_nav {
            self.open = false;
        }
    }

    /// A menu item was followed.
    pub fn on_navigate(&mut self) {
        self.open = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggles() {
        let mut m = RadialMenu::default();
        assert_eq!(m.aria_expanded(), "false");
        assert!(m.toggle());
        assert_eq!(m.aria_expanded(), "true");
        assert!(!m.toggle());
    }

    #[test]
    fn escape_closes_other_keys_do_not() {
        let mut m = RadialMenu::default();
        m.set_open(true);
        assert!(!m.on_key("Enter"));
        assert!(m.is_open());
        assert!(m.on_key("Escape"));
        assert!(!m.is_open());
    }

    #[test]
    fn outside_click_closes_inside_click_keeps() {
        let mut m = RadialMenu::default();
        m.set_open(true);
        m.on_click(true);
        assert!(m.is_open());
        m.on_click(false);
        assert!(!m.is_open());
    }

    #[test]
    fn navigating_closes() {
        let mut m = RadialMenu::default();
        m.toggle();
        m.on_navigate();
        assert!(!m.is_open());
    }
}
