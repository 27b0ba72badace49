use menu_core::MenuItem;
use wasm_bindgen::JsValue;
use web_sys as web;

const TITLE_ID: &str = "menu-title";
const DATE_ID: &str = "menu-date";
const MOVING_ATTR: &str = "data-moving";

/// Optional title/date overlay. Present only if the page provides both
/// `#menu-title` and `#menu-date`.
pub struct Overlay {
    title: web::Element,
    date: web::Element,
}

impl Overlay {
    pub fn find(document: &web::Document) -> Option<Self> {
        let title = document.get_element_by_id(TITLE_ID)?;
        let date = document.get_element_by_id(DATE_ID)?;
        Some(Self { title, date })
    }

    pub fn show_item(&self, item: &MenuItem) {
        self.title.set_text_content(Some(&item.title));
        self.date.set_text_content(Some(&format_date(item)));
    }

    pub fn set_moving(&self, moving: bool) {
        let value = if moving { "true" } else { "false" };
        let _ = self.title.set_attribute(MOVING_ATTR, value);
        let _ = self.date.set_attribute(MOVING_ATTR, value);
    }
}

/// Long weekday, month, day and year in the item's locale.
pub fn format_date(item: &MenuItem) -> String {
    let date = js_sys::Date::new(&JsValue::from_f64(item.date.timestamp_millis() as f64));
    let opts = js_sys::Object::new();
    for (key, value) in [
        ("weekday", "long"),
        ("year", "numeric"),
        ("month", "long"),
        ("day", "numeric"),
    ] {
        let _ = js_sys::Reflect::set(&opts, &key.into(), &value.into());
    }
    date.to_locale_date_string(&item.locale, &opts).into()
}
