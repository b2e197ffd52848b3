// DOM widgets kept in sync with the favorites store

use homefav_core::{badge_text, FavoriteId, FavoritesEvent};
use log::warn;
use std::cell::{Cell, RefCell};
use std::time::Duration;
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, HtmlElement};

/// Selector for every badge counter on the page
pub const BADGE_SELECTOR: &str = ".favorites-count";

/// Heart on the detail page carousel; carries no id attribute
pub const DETAIL_CAROUSEL_ICON: &str = ".carousel-favorite-btn i";

/// Toast starts off-screen (`translate-x-full`) and slides in
pub const TOAST_CLASSES: &str = "favorites-toast fixed top-4 right-4 bg-primary text-white px-4 py-2 rounded-lg shadow-lg z-50 transition-all duration-300 transform translate-x-full";
const TOAST_HIDDEN_CLASS: &str = "translate-x-full";
const TOAST_ENTER_DELAY: Duration = Duration::from_millis(100);
const TOAST_VISIBLE: Duration = Duration::from_millis(3000);
const TOAST_EXIT: Duration = Duration::from_millis(300);

/// Classes applied to a heart icon, as (added, removed)
pub fn icon_classes(is_favorite: bool) -> (&'static [&'static str], &'static [&'static str]) {
    const FILLED: &[&str] = &["fas", "text-red-500"];
    const OUTLINE: &[&str] = &["far", "text-gray-600"];
    if is_favorite {
        (FILLED, OUTLINE)
    } else {
        (OUTLINE, FILLED)
    }
}

/// Selectors matching every icon that represents `id`: grid cards, map popups,
/// carousel buttons and the legacy `#favorite-<id>` icons. On the detail page
/// of `id` the carousel heart is matched without an id attribute.
pub fn icon_selectors(id: FavoriteId, is_detail_property: bool) -> String {
    let mut selectors = format!(
        ".favorite-btn[data-property-id=\"{id}\"] i, .carousel-favorite-btn[data-property-id=\"{id}\"] i, #favorite-{id}",
        id = id
    );
    if is_detail_property {
        selectors.push_str(", ");
        selectors.push_str(DETAIL_CAROUSEL_ICON);
    }
    selectors
}

/// User-facing toast texts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToastMessages {
    pub added: String,
    pub removed: String,
    pub cleared: String,
}

impl Default for ToastMessages {
    fn default() -> Self {
        Self {
            added: "Добавлено в избранное".to_string(),
            removed: "Удалено из избранного".to_string(),
            cleared: "Избранное очищено".to_string(),
        }
    }
}

impl ToastMessages {
    /// Text for a user-visible change; re-publishes stay silent
    pub fn for_event(&self, event: &FavoritesEvent) -> Option<&str> {
        match event {
            FavoritesEvent::Changed { is_favorite: true, .. } => Some(&self.added),
            FavoritesEvent::Changed { is_favorite: false, .. } => Some(&self.removed),
            FavoritesEvent::Cleared { .. } => Some(&self.cleared),
            FavoritesEvent::Refreshed { .. } | FavoritesEvent::Synced { .. } => None,
        }
    }
}

fn document() -> Option<Document> {
    web_sys::window().and_then(|w| w.document())
}

fn for_each_match(document: &Document, selector: &str, mut f: impl FnMut(Element)) {
    let nodes = match document.query_selector_all(selector) {
        Ok(nodes) => nodes,
        Err(e) => {
            warn!("Invalid selector {}: {:?}", selector, e);
            return;
        }
    };
    for i in 0..nodes.length() {
        if let Some(element) = nodes.get(i).and_then(|n| n.dyn_into::<Element>().ok()) {
            f(element);
        }
    }
}

/// Switch every icon for `id` between filled and outline
pub fn apply_favorite_state(document: &Document, id: FavoriteId, is_favorite: bool, is_detail_property: bool) {
    let (add, remove) = icon_classes(is_favorite);
    for_each_match(document, &icon_selectors(id, is_detail_property), |icon| {
        let classes = icon.class_list();
        for class in remove {
            let _ = classes.remove_1(class);
        }
        for class in add {
            let _ = classes.add_1(class);
        }
    });
}

/// Show the count on every badge, hiding them at zero
pub fn apply_badge(document: &Document, count: usize) {
    let text = badge_text(count);
    for_each_match(document, BADGE_SELECTOR, |badge| {
        let classes = badge.class_list();
        match &text {
            Some(text) => {
                badge.set_text_content(Some(text));
                let _ = classes.remove_1("hidden");
                let _ = classes.add_1("inline-flex");
            }
            None => {
                badge.set_text_content(Some("0"));
                let _ = classes.add_1("hidden");
                let _ = classes.remove_1("inline-flex");
            }
        }
        if let Some(html) = badge.dyn_ref::<HtmlElement>() {
            let display = if text.is_some() { "inline-flex" } else { "none" };
            let _ = html.style().set_property("display", display);
        }
    });
}

/// Append a toast to `<body>` and schedule its slide-in and removal
pub fn show_toast(document: &Document, message: &str) -> Option<Element> {
    let body = document.body()?;
    let toast = match document.create_element("div") {
        Ok(toast) => toast,
        Err(e) => {
            warn!("Failed to create toast: {:?}", e);
            return None;
        }
    };
    toast.set_class_name(TOAST_CLASSES);
    toast.set_text_content(Some(message));
    if let Err(e) = body.append_child(&toast) {
        warn!("Failed to attach toast: {:?}", e);
        return None;
    }

    let animated = toast.clone();
    wasm_bindgen_futures::spawn_local(async move {
        gloo_timers::future::sleep(TOAST_ENTER_DELAY).await;
        let _ = animated.class_list().remove_1(TOAST_HIDDEN_CLASS);
        gloo_timers::future::sleep(TOAST_VISIBLE).await;
        let _ = animated.class_list().add_1(TOAST_HIDDEN_CLASS);
        gloo_timers::future::sleep(TOAST_EXIT).await;
        animated.remove();
    });
    Some(toast)
}

/// Page widgets driven by store events: heart icons, badges and toasts.
#[derive(Debug, Default)]
pub struct Widgets {
    detail_id: Cell<Option<FavoriteId>>,
    messages: RefCell<ToastMessages>,
}

impl Widgets {
    /// The listing shown on a detail page, whose carousel heart has no id
    pub fn set_detail_property(&self, id: Option<FavoriteId>) {
        self.detail_id.set(id);
    }

    pub fn set_messages(&self, messages: ToastMessages) {
        *self.messages.borrow_mut() = messages;
    }

    /// Update icons and badges for `event`
    pub fn render(&self, document: &Document, event: &FavoritesEvent) {
        let detail_id = self.detail_id.get();
        for (id, is_favorite) in event.states() {
            apply_favorite_state(document, id, is_favorite, detail_id == Some(id));
        }
        apply_badge(document, event.count());
    }

    /// Toast for user-visible changes
    pub fn announce(&self, document: &Document, event: &FavoritesEvent) -> Option<Element> {
        let messages = self.messages.borrow();
        let message = messages.for_event(event)?;
        show_toast(document, message)
    }

    /// Store subscriber for icons and badges
    pub fn render_event(&self, event: &FavoritesEvent) {
        if let Some(document) = document() {
            self.render(&document, event);
        }
    }

    /// Store subscriber for toasts
    pub fn announce_event(&self, event: &FavoritesEvent) {
        if let Some(document) = document() {
            self.announce(&document, event);
        }
    }
}


#[cfg(all(test, target_arch = "wasm32"))]
mod dom_tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    fn id(raw: i64) -> FavoriteId {
        FavoriteId::new(raw).unwrap()
    }

    fn fixture(html: &str) -> Document {
        let document = document().unwrap();
        document.body().unwrap().set_inner_html(html);
        document
    }

    fn classes(document: &Document, selector: &str) -> Vec<String> {
        let mut found = Vec::new();
        for_each_match(document, selector, |el| found.push(el.class_name()));
        found
    }

    fn badge(document: &Document) -> HtmlElement {
        document
            .query_selector(BADGE_SELECTOR)
            .unwrap()
            .unwrap()
            .dyn_into::<HtmlElement>()
            .unwrap()
    }

    #[wasm_bindgen_test]
    fn toggle_updates_every_icon_for_the_id() {
        let document = fixture(
            r#"<button class="favorite-btn" data-property-id="7"><i class="far text-gray-600"></i></button>
               <div class="popup"><button class="favorite-btn" data-property-id="7"><i class="far text-gray-600"></i></button></div>
               <button class="favorite-btn" data-property-id="8"><i class="far text-gray-600"></i></button>
               <i id="favorite-7" class="far"></i>
               <span class="favorites-count hidden">0</span>"#,
        );
        let widgets = Widgets::default();

        widgets.render(&document, &FavoritesEvent::Changed { id: id(7), is_favorite: true, count: 1 });

        let icons = classes(&document, ".favorite-btn[data-property-id=\"7\"] i, #favorite-7");
        assert_eq!(icons.len(), 3);
        for class in &icons {
            assert!(class.contains("fas") && class.contains("text-red-500"), "{}", class);
            assert!(!class.contains("far"), "{}", class);
        }
        let other = classes(&document, ".favorite-btn[data-property-id=\"8\"] i");
        assert_eq!(other, vec!["far text-gray-600".to_string()]);

        let badge = badge(&document);
        assert_eq!(badge.text_content().as_deref(), Some("1"));
        assert!(badge.class_list().contains("inline-flex"));
        assert!(!badge.class_list().contains("hidden"));
        assert_eq!(badge.style().get_property_value("display").unwrap(), "inline-flex");
    }

    #[wasm_bindgen_test]
    fn badge_hides_at_zero_and_caps_at_99() {
        let document = fixture(r#"<span class="favorites-count">5</span>"#);
        let widgets = Widgets::default();
        let many: Vec<FavoriteId> = (1..=120).map(id).collect();

        widgets.render(&document, &FavoritesEvent::Synced { ids: many });
        assert_eq!(badge(&document).text_content().as_deref(), Some("99+"));

        widgets.render(&document, &FavoritesEvent::Cleared { removed: vec![id(1)] });
        let badge = badge(&document);
        assert!(badge.class_list().contains("hidden"));
        assert_eq!(badge.style().get_property_value("display").unwrap(), "none");
    }

    #[wasm_bindgen_test]
    fn detail_carousel_heart_follows_detail_property() {
        let document = fixture(r#"<button class="carousel-favorite-btn"><i class="far"></i></button>"#);
        let widgets = Widgets::default();

        widgets.render(&document, &FavoritesEvent::Changed { id: id(42), is_favorite: true, count: 1 });
        assert_eq!(classes(&document, DETAIL_CAROUSEL_ICON), vec!["far".to_string()]);

        widgets.set_detail_property(Some(id(42)));
        widgets.render(&document, &FavoritesEvent::Changed { id: id(42), is_favorite: true, count: 1 });
        let icon = classes(&document, DETAIL_CAROUSEL_ICON);
        assert!(icon[0].contains("fas") && !icon[0].contains("far"));
    }

    #[wasm_bindgen_test]
    fn toast_is_appended_for_changes_only() {
        let document = fixture("");
        let widgets = Widgets::default();

        let toast = widgets
            .announce(&document, &FavoritesEvent::Changed { id: id(7), is_favorite: true, count: 1 })
            .unwrap();
        assert_eq!(toast.text_content().as_deref(), Some("Добавлено в избранное"));
        assert!(toast.class_list().contains(TOAST_HIDDEN_CLASS));
        assert_eq!(classes(&document, ".favorites-toast").len(), 1);

        assert!(widgets
            .announce(&document, &FavoritesEvent::Refreshed { id: id(7), is_favorite: true, count: 1 })
            .is_none());
        assert_eq!(classes(&document, ".favorites-toast").len(), 1);
    }
}
