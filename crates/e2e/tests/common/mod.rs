//! Offline fixtures shared by the integration tests: an in-memory storefront
//! behind the `Driver` trait and an axum mock of the users API.

#![allow(dead_code)]

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::get;
use axum::{Json, Router};
use parking_lot::Mutex;
use serde::Deserialize;
use serde_json::{json, Value};

use storefront_common::{ApiConfig, EnvConfig};
use storefront_e2e::driver::{Driver, Launcher, Locator};
use storefront_e2e::pages::home::product_slug;
use storefront_e2e::selectors::{
    cart, checkout, complete, inventory, login, overview, routes, TEST_ID_ATTR,
};
use storefront_e2e::{E2eError, E2eResult, Session};

pub const SHOP_URL: &str = "https://shop.test";
pub const USERNAME: &str = "standard_user";
pub const PASSWORD: &str = "secret_sauce";
pub const API_KEY: &str = "test-key";

#[derive(Debug)]
pub struct Product {
    pub name: &'static str,
    pub desc: &'static str,
    pub price: f64,
}

/// Small catalog with round prices
pub const CATALOG: &[Product] = &[
    Product {
        name: "Sauce Labs Bike Light",
        desc: "A red light isn't the desired state in testing.",
        price: 7.5,
    },
    Product {
        name: "Sauce Labs Bolt T-Shirt",
        desc: "Get your testing superhero on.",
        price: 12.5,
    },
    Product {
        name: "Sauce Labs Backpack",
        desc: "carry.allTheThings() with the sleek Sly Pack.",
        price: 30.0,
    },
];

/// The storefront's real catalog, cent prices included
pub const STOREFRONT_CATALOG: &[Product] = &[
    Product {
        name: "Sauce Labs Backpack",
        desc: "carry.allTheThings() with the sleek, streamlined Sly Pack.",
        price: 29.99,
    },
    Product {
        name: "Sauce Labs Bike Light",
        desc: "A red light isn't the desired state in testing but it sure helps when riding your bike at night.",
        price: 9.99,
    },
    Product {
        name: "Sauce Labs Bolt T-Shirt",
        desc: "Get your testing superhero on with the Sauce Labs bolt T-shirt.",
        price: 15.99,
    },
    Product {
        name: "Sauce Labs Fleece Jacket",
        desc: "It's not every day that you come across a midweight quarter-zip fleece jacket.",
        price: 49.99,
    },
    Product {
        name: "Sauce Labs Onesie",
        desc: "Rib snap infant onesie for the junior automation engineer in development.",
        price: 7.99,
    },
    Product {
        name: "Test.allTheThings() T-Shirt (Red)",
        desc: "This classic Sauce Labs t-shirt is perfect to wear when cozying up to your keyboard.",
        price: 15.99,
    },
];

/// Environment pointing at the fake shop, with short expectation timeouts
pub fn shop_config(api_url: &str) -> EnvConfig {
    let json = json!({
        "baseUrl": SHOP_URL,
        "env": {
            "login": { "username": USERNAME, "password": PASSWORD },
            "api": { "url": api_url, "headers": { "x-api-key": API_KEY } }
        },
        "timeouts": { "expectMs": 300, "pollMs": 10, "apiLatencyMs": 500 }
    });
    EnvConfig::from_json(&json.to_string()).unwrap()
}

/// A session on a fresh fake shop
pub fn shop_session(options: ShopOptions) -> (Session, Arc<FakeShop>) {
    let shop = Arc::new(FakeShop::new(options));
    let session = Session::new(shop.clone(), Arc::new(shop_config("http://127.0.0.1:9")));
    (session, shop)
}

// ---------------------------------------------------------------------------
// Mini DOM
// ---------------------------------------------------------------------------

const ROOT: usize = 0;

#[derive(Debug, Clone)]
struct Element {
    tag: String,
    attrs: BTreeMap<String, String>,
    text: String,
    children: Vec<usize>,
    parent: Option<usize>,
}

struct Dom {
    nodes: Vec<Element>,
}

impl Dom {
    fn new() -> Self {
        Self {
            nodes: vec![Element {
                tag: "#document".to_string(),
                attrs: BTreeMap::new(),
                text: String::new(),
                children: vec![],
                parent: None,
            }],
        }
    }

    fn add(&mut self, parent: usize, tag: &str, attrs: &[(&str, &str)], text: &str) -> usize {
        let id = self.nodes.len();
        self.nodes.push(Element {
            tag: tag.to_string(),
            attrs: attrs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            text: text.to_string(),
            children: vec![],
            parent: Some(parent),
        });
        self.nodes[parent].children.push(id);
        id
    }

    /// Element carrying a test id
    fn tid(&mut self, parent: usize, tag: &str, test_id: &str, text: &str) -> usize {
        self.add(parent, tag, &[(TEST_ID_ATTR, test_id)], text)
    }

    fn text_content(&self, id: usize) -> String {
        let mut out = self.nodes[id].text.clone();
        for &child in &self.nodes[id].children {
            out.push_str(&self.text_content(child));
        }
        out
    }

    fn descendants(&self, id: usize, out: &mut Vec<usize>) {
        for &child in &self.nodes[id].children {
            out.push(child);
            self.descendants(child, out);
        }
    }

    fn query(&self, from: usize, selector: &Compound) -> Vec<usize> {
        let mut all = Vec::new();
        self.descendants(from, &mut all);
        all.into_iter()
            .filter(|&id| selector.matches(&self.nodes[id]))
            .collect()
    }

    /// Same resolution the browser script performs
    fn resolve(&self, locator: &Locator) -> Vec<usize> {
        let mut els = vec![ROOT];
        for segment in locator.segments() {
            let selector = Compound::parse(&segment.css);
            els = els.iter().flat_map(|&e| self.query(e, &selector)).collect();
            if let Some(n) = segment.nth {
                els = els.get(n).copied().into_iter().collect();
            }
        }
        els
    }

    fn test_id_of(&self, mut id: usize) -> Option<String> {
        loop {
            if let Some(t) = self.nodes[id].attrs.get(TEST_ID_ATTR) {
                return Some(t.clone());
            }
            id = self.nodes[id].parent?;
        }
    }
}

/// `tag#id.class[attr="value"]`; no combinators
#[derive(Debug, Default)]
struct Compound {
    tag: Option<String>,
    id: Option<String>,
    classes: Vec<String>,
    attrs: Vec<(String, Option<String>)>,
}

impl Compound {
    fn parse(selector: &str) -> Self {
        let chars: Vec<char> = selector.trim().chars().collect();
        let mut out = Compound::default();
        let is_boundary = |c: char| matches!(c, '.' | '#' | '[');
        let mut i = 0;

        while i < chars.len() {
            match chars[i] {
                '[' => {
                    let end = chars[i..]
                        .iter()
                        .position(|&c| c == ']')
                        .map(|p| i + p)
                        .unwrap_or_else(|| panic!("unclosed [ in {:?}", selector));
                    let inner: String = chars[i + 1..end].iter().collect();
                    match inner.split_once('=') {
                        Some((name, value)) => out.attrs.push((
                            name.trim().to_string(),
                            Some(value.trim().trim_matches('"').trim_matches('\'').to_string()),
                        )),
                        None => out.attrs.push((inner.trim().to_string(), None)),
                    }
                    i = end + 1;
                }
                kind @ ('.' | '#') => {
                    let start = i + 1;
                    let mut end = start;
                    while end < chars.len() && !is_boundary(chars[end]) {
                        end += 1;
                    }
                    let ident: String = chars[start..end].iter().collect();
                    if kind == '.' {
                        out.classes.push(ident);
                    } else {
                        out.id = Some(ident);
                    }
                    i = end;
                }
                c if c.is_whitespace() || c == '>' || c == '+' || c == '~' => {
                    panic!("fake shop supports compound selectors only: {:?}", selector)
                }
                _ => {
                    let start = i;
                    let mut end = i;
                    while end < chars.len() && !is_boundary(chars[end]) {
                        end += 1;
                    }
                    out.tag = Some(chars[start..end].iter().collect());
                    i = end;
                }
            }
        }
        out
    }

    fn matches(&self, el: &Element) -> bool {
        if let Some(tag) = &self.tag {
            if !el.tag.eq_ignore_ascii_case(tag) {
                return false;
            }
        }
        if let Some(id) = &self.id {
            if el.attrs.get("id") != Some(id) {
                return false;
            }
        }
        let classes: Vec<&str> = el
            .attrs
            .get("class")
            .map(|c| c.split_whitespace().collect())
            .unwrap_or_default();
        if !self.classes.iter().all(|c| classes.contains(&c.as_str())) {
            return false;
        }
        self.attrs.iter().all(|(name, value)| match value {
            Some(v) => el.attrs.get(name) == Some(v),
            None => el.attrs.contains_key(name),
        })
    }
}

// ---------------------------------------------------------------------------
// Fake shop
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default)]
pub struct ShopOptions {
    /// Render this tax instead of the correct one
    pub tax_override: Option<f64>,

    /// Uncaught exceptions the application throws
    pub page_errors: Vec<String>,

    /// Products on sale; `CATALOG` when unset
    pub catalog: Option<&'static [Product]>,

    /// Element lookups that fail with a browser error before the page settles
    pub transient_errors: usize,
}

#[derive(Debug, Default)]
struct ShopState {
    route: String,
    logged_in: bool,
    cart: Vec<usize>,
    form: HashMap<String, String>,
    error: Option<String>,
    closed: bool,
    screenshots: usize,
    transient_errors: usize,
}

/// The storefront rendered from in-memory state on every call
pub struct FakeShop {
    options: ShopOptions,
    state: Mutex<ShopState>,
}

fn money(value: f64) -> String {
    format!("${:.2}", value)
}

impl FakeShop {
    pub fn new(options: ShopOptions) -> Self {
        let transient_errors = options.transient_errors;
        Self {
            options,
            state: Mutex::new(ShopState {
                route: "about:blank".to_string(),
                transient_errors,
                ..ShopState::default()
            }),
        }
    }

    pub fn catalog(&self) -> &'static [Product] {
        self.options.catalog.unwrap_or(CATALOG)
    }

    pub fn route(&self) -> String {
        self.state.lock().route.clone()
    }

    pub fn cart_names(&self) -> Vec<&'static str> {
        self.state.lock().cart.iter().map(|&i| self.catalog()[i].name).collect()
    }

    pub fn is_closed(&self) -> bool {
        self.state.lock().closed
    }

    pub fn screenshots(&self) -> usize {
        self.state.lock().screenshots
    }

    /// Log in directly, bypassing the form
    pub fn force_login(&self) {
        let mut st = self.state.lock();
        st.logged_in = true;
        st.route = routes::INVENTORY.to_string();
    }

    fn render(&self, st: &ShopState) -> Dom {
        let mut dom = Dom::new();
        let body = dom.add(ROOT, "body", &[], "");

        match st.route.as_str() {
            routes::INVENTORY => {
                self.header(&mut dom, body, st);
                self.inventory(&mut dom, body, st);
            }
            routes::CART => {
                self.header(&mut dom, body, st);
                let list = dom.tid(body, "div", cart::LIST, "");
                for &i in &st.cart {
                    self.cart_line(&mut dom, list, i, true);
                }
                dom.tid(body, "button", cart::CONTINUE_SHOPPING, "Continue Shopping");
                dom.tid(body, "button", cart::CHECKOUT, "Checkout");
            }
            routes::CHECKOUT_STEP_ONE => {
                self.header(&mut dom, body, st);
                for field in [checkout::FIRST_NAME, checkout::LAST_NAME, checkout::POSTAL_CODE] {
                    let value = st.form.get(field).cloned().unwrap_or_default();
                    dom.add(body, "input", &[(TEST_ID_ATTR, field), ("value", value.as_str())], "");
                }
                if let Some(error) = &st.error {
                    dom.tid(body, "h3", "error", error);
                }
                dom.tid(body, "button", checkout::CANCEL, "Cancel");
                dom.add(
                    body,
                    "input",
                    &[(TEST_ID_ATTR, checkout::CONTINUE), ("type", "submit"), ("value", "Continue")],
                    "",
                );
            }
            routes::CHECKOUT_STEP_TWO => {
                self.header(&mut dom, body, st);
                let list = dom.tid(body, "div", cart::LIST, "");
                for &i in &st.cart {
                    self.cart_line(&mut dom, list, i, false);
                }
                let subtotal: f64 = st.cart.iter().map(|&i| self.catalog()[i].price).sum();
                let tax = self
                    .options
                    .tax_override
                    .unwrap_or_else(|| (subtotal * 0.08 * 100.0).round() / 100.0);
                let info = dom.add(body, "div", &[("class", "summary_info")], "");
                dom.tid(info, "div", overview::SUBTOTAL, &format!("Item total: {}", money(subtotal)));
                dom.tid(info, "div", overview::TAX, &format!("Tax: {}", money(tax)));
                dom.tid(info, "div", overview::TOTAL, &format!("Total: {}", money(subtotal + tax)));
                dom.tid(body, "button", checkout::CANCEL, "Cancel");
                dom.tid(body, "button", overview::FINISH, "Finish");
            }
            routes::CHECKOUT_COMPLETE => {
                self.header(&mut dom, body, st);
                let container = dom.tid(body, "div", complete::CONTAINER, "");
                dom.add(container, "img", &[(TEST_ID_ATTR, complete::IMG), ("alt", "Pony Express")], "");
                dom.tid(container, "h2", complete::HEADER, complete::THANK_YOU);
                dom.add(
                    container,
                    "div",
                    &[("class", "complete-text")],
                    "Your order has been dispatched, and will arrive just as fast as the pony can get there!",
                );
                dom.tid(container, "button", complete::BACK_HOME, "Back Home");
            }
            routes::LOGIN => {
                let wrapper = dom.add(body, "div", &[("class", "login_wrapper")], "");
                for field in [login::USERNAME, login::PASSWORD] {
                    let value = st.form.get(field).cloned().unwrap_or_default();
                    dom.add(wrapper, "input", &[(TEST_ID_ATTR, field), ("value", value.as_str())], "");
                }
                if let Some(error) = &st.error {
                    dom.tid(wrapper, "h3", "error", error);
                }
                dom.add(
                    wrapper,
                    "input",
                    &[(TEST_ID_ATTR, login::SUBMIT), ("type", "submit"), ("value", "Login")],
                    "",
                );
            }
            _ => {}
        }
        dom
    }

    fn header(&self, dom: &mut Dom, body: usize, st: &ShopState) {
        let container = dom.add(body, "div", &[("id", "shopping_cart_container")], "");
        let link = dom.add(
            container,
            "a",
            &[("class", "shopping_cart_link"), (TEST_ID_ATTR, cart::LINK)],
            "",
        );
        if !st.cart.is_empty() {
            dom.tid(link, "span", cart::BADGE, &st.cart.len().to_string());
        }
    }

    fn inventory(&self, dom: &mut Dom, body: usize, st: &ShopState) {
        let list = dom.add(body, "div", &[("class", "inventory_list")], "");
        for (i, product) in self.catalog().iter().enumerate() {
            let item = dom.add(list, "div", &[("class", "inventory_item"), (TEST_ID_ATTR, inventory::ITEM)], "");
            let img = dom.add(item, "div", &[("class", "inventory_item_img")], "");
            let link = dom.add(img, "a", &[("href", "#")], "");
            dom.add(link, "img", &[("class", "inventory_item_img"), ("alt", product.name)], "");

            let description = dom.tid(item, "div", inventory::DESCRIPTION, "");
            let label = dom.add(description, "div", &[("class", "inventory_item_label")], "");
            let name_link = dom.add(label, "a", &[("href", "#")], "");
            dom.tid(name_link, "div", inventory::NAME, product.name);
            dom.tid(label, "div", inventory::DESC, product.desc);

            let bar = dom.add(description, "div", &[("class", "pricebar")], "");
            dom.tid(bar, "div", inventory::PRICE, &money(product.price));
            let slug = product_slug(product.name);
            if st.cart.contains(&i) {
                dom.tid(bar, "button", &inventory::remove(&slug), inventory::REMOVE_TEXT);
            } else {
                dom.tid(bar, "button", &inventory::add_to_cart(&slug), inventory::ADD_TO_CART_TEXT);
            }
        }
    }

    fn cart_line(&self, dom: &mut Dom, list: usize, index: usize, removable: bool) {
        let product = &self.catalog()[index];
        let item = dom.add(list, "div", &[("class", "cart_item"), (TEST_ID_ATTR, inventory::ITEM)], "");
        dom.tid(item, "div", "item-quantity", "1");
        let label = dom.add(item, "div", &[("class", "cart_item_label")], "");
        let link = dom.add(label, "a", &[("href", "#")], "");
        dom.tid(link, "div", inventory::NAME, product.name);
        dom.tid(label, "div", inventory::DESC, product.desc);
        let bar = dom.add(label, "div", &[("class", "item_pricebar")], "");
        dom.tid(bar, "div", inventory::PRICE, &money(product.price));
        if removable {
            let slug = product_slug(product.name);
            dom.tid(bar, "button", &inventory::remove(&slug), inventory::REMOVE_TEXT);
        }
    }

    /// Apply the effect of clicking an element with this test id
    fn activate(&self, st: &mut ShopState, test_id: &str) {
        match test_id {
            login::SUBMIT => {
                let user = st.form.get(login::USERNAME).map(String::as_str);
                let pass = st.form.get(login::PASSWORD).map(String::as_str);
                if user == Some(USERNAME) && pass == Some(PASSWORD) {
                    st.logged_in = true;
                    st.error = None;
                    st.route = routes::INVENTORY.to_string();
                } else {
                    st.error = Some(
                        "Epic sadface: Username and password do not match any user in this service"
                            .to_string(),
                    );
                }
            }
            cart::LINK => st.route = routes::CART.to_string(),
            cart::CONTINUE_SHOPPING => st.route = routes::INVENTORY.to_string(),
            cart::CHECKOUT => st.route = routes::CHECKOUT_STEP_ONE.to_string(),
            checkout::CONTINUE => {
                let missing = [checkout::FIRST_NAME, checkout::LAST_NAME, checkout::POSTAL_CODE]
                    .into_iter()
                    .find(|f| st.form.get(*f).map_or(true, |v| v.is_empty()));
                match missing {
                    Some(field) => st.error = Some(format!("Error: {} is required", field)),
                    None => {
                        st.error = None;
                        st.route = routes::CHECKOUT_STEP_TWO.to_string();
                    }
                }
            }
            checkout::CANCEL => {
                st.route = if st.route == routes::CHECKOUT_STEP_TWO {
                    routes::INVENTORY.to_string()
                } else {
                    routes::CART.to_string()
                };
            }
            overview::FINISH => {
                st.cart.clear();
                st.route = routes::CHECKOUT_COMPLETE.to_string();
            }
            complete::BACK_HOME => st.route = routes::INVENTORY.to_string(),
            id => {
                if let Some(slug) = id.strip_prefix("add-to-cart-") {
                    if let Some(i) = self.catalog().iter().position(|p| product_slug(p.name) == slug) {
                        if !st.cart.contains(&i) {
                            st.cart.push(i);
                        }
                    }
                } else if let Some(slug) = id.strip_prefix("remove-") {
                    let catalog = self.catalog();
                    st.cart.retain(|&i| product_slug(catalog[i].name) != slug);
                }
            }
        }
    }
}

#[async_trait]
impl Driver for FakeShop {
    async fn goto(&self, url: &str) -> E2eResult<()> {
        let path = url.strip_prefix(SHOP_URL).unwrap_or(url);
        let path = if path.is_empty() { routes::LOGIN } else { path };

        let known = [
            routes::LOGIN,
            routes::INVENTORY,
            routes::CART,
            routes::CHECKOUT_STEP_ONE,
            routes::CHECKOUT_STEP_TWO,
            routes::CHECKOUT_COMPLETE,
        ];
        if !known.contains(&path) {
            return Err(E2eError::Navigation(format!("{}: 404", url)));
        }

        let mut st = self.state.lock();
        if path != routes::LOGIN && !st.logged_in {
            st.error = Some(format!(
                "Epic sadface: You can only access '{}' when you are logged in.",
                path
            ));
            st.route = routes::LOGIN.to_string();
        } else {
            st.error = None;
            st.route = path.to_string();
        }
        Ok(())
    }

    async fn current_url(&self) -> E2eResult<String> {
        let st = self.state.lock();
        if st.route.starts_with('/') {
            Ok(format!("{}{}", SHOP_URL, st.route))
        } else {
            Ok(st.route.clone())
        }
    }

    async fn count(&self, locator: &Locator) -> E2eResult<usize> {
        let mut st = self.state.lock();
        if st.transient_errors > 0 {
            st.transient_errors -= 1;
            return Err(E2eError::Browser(
                "Execution context was destroyed".to_string(),
            ));
        }
        Ok(self.render(&st).resolve(locator).len())
    }

    async fn texts(&self, locator: &Locator) -> E2eResult<Vec<String>> {
        let st = self.state.lock();
        let dom = self.render(&st);
        Ok(dom
            .resolve(locator)
            .into_iter()
            .map(|id| dom.text_content(id))
            .collect())
    }

    async fn attribute(&self, locator: &Locator, name: &str) -> E2eResult<Option<String>> {
        let st = self.state.lock();
        let dom = self.render(&st);
        Ok(dom
            .resolve(locator)
            .first()
            .and_then(|&id| dom.nodes[id].attrs.get(name).cloned()))
    }

    async fn is_visible(&self, locator: &Locator) -> E2eResult<bool> {
        let st = self.state.lock();
        Ok(!self.render(&st).resolve(locator).is_empty())
    }

    async fn click(&self, locator: &Locator) -> E2eResult<()> {
        let mut st = self.state.lock();
        let dom = self.render(&st);
        let id = *dom
            .resolve(locator)
            .first()
            .ok_or_else(|| E2eError::Browser(format!("nothing to click: {}", locator)))?;
        if let Some(test_id) = dom.test_id_of(id) {
            self.activate(&mut st, &test_id);
        }
        Ok(())
    }

    async fn fill(&self, locator: &Locator, value: &str) -> E2eResult<()> {
        let mut st = self.state.lock();
        let dom = self.render(&st);
        let id = *dom
            .resolve(locator)
            .first()
            .ok_or_else(|| E2eError::Browser(format!("nothing to fill: {}", locator)))?;
        let el = &dom.nodes[id];
        if el.tag != "input" {
            return Err(E2eError::Browser(format!("{} is not an input", locator)));
        }
        if let Some(key) = el.attrs.get(TEST_ID_ATTR) {
            st.form.insert(key.clone(), value.to_string());
        }
        Ok(())
    }

    async fn count_text(&self, text: &str) -> E2eResult<usize> {
        let st = self.state.lock();
        let dom = self.render(&st);
        let needle = text.to_lowercase();
        Ok(dom
            .nodes
            .iter()
            .filter(|el| !el.text.is_empty() && el.text.to_lowercase().contains(&needle))
            .count())
    }

    async fn clear_session(&self) -> E2eResult<()> {
        let mut st = self.state.lock();
        st.logged_in = false;
        st.cart.clear();
        st.form.clear();
        st.error = None;
        Ok(())
    }

    async fn screenshot(&self) -> E2eResult<Vec<u8>> {
        self.state.lock().screenshots += 1;
        Ok(b"\x89PNG\r\n\x1a\nfake".to_vec())
    }

    fn page_errors(&self) -> Vec<String> {
        self.options.page_errors.clone()
    }

    async fn close(&self) -> E2eResult<()> {
        self.state.lock().closed = true;
        Ok(())
    }
}

/// Hands out a fresh shop per scenario and keeps them for inspection
#[derive(Default)]
pub struct FakeLauncher {
    options: ShopOptions,
    shops: Mutex<Vec<Arc<FakeShop>>>,
}

impl FakeLauncher {
    pub fn new(options: ShopOptions) -> Arc<Self> {
        Arc::new(Self {
            options,
            shops: Mutex::new(Vec::new()),
        })
    }

    pub fn shops(&self) -> Vec<Arc<FakeShop>> {
        self.shops.lock().clone()
    }
}

#[async_trait]
impl Launcher for FakeLauncher {
    async fn launch(&self) -> E2eResult<Arc<dyn Driver>> {
        let shop = Arc::new(FakeShop::new(self.options.clone()));
        self.shops.lock().push(shop.clone());
        Ok(shop as Arc<dyn Driver>)
    }
}

/// A launcher whose browser never starts
pub struct BrokenLauncher;

#[async_trait]
impl Launcher for BrokenLauncher {
    async fn launch(&self) -> E2eResult<Arc<dyn Driver>> {
        Err(E2eError::Browser("chrome not found".to_string()))
    }
}

// ---------------------------------------------------------------------------
// Users API mock
// ---------------------------------------------------------------------------

const LAST_NAMES: &[&str] = &[
    "Bluth", "Weaver", "Wong", "Holt", "Morris", "Ramos", "Lawson", "Ferguson", "Funke", "Fields",
    "Edwards", "Howell",
];

#[derive(Debug, Clone)]
pub struct MockApi {
    pub users: usize,
    pub per_page: usize,

    /// Report this `total` instead of the real one
    pub reported_total: Option<u64>,

    /// Every user shares one last name
    pub duplicate_last_names: bool,

    /// Answer this page with a 500
    pub broken_page: Option<u64>,

    /// Delay before answering a create
    pub create_delay: Duration,

    /// Return `id` as a number instead of a string
    pub numeric_id: bool,
}

impl Default for MockApi {
    fn default() -> Self {
        Self {
            users: 12,
            per_page: 6,
            reported_total: None,
            duplicate_last_names: false,
            broken_page: None,
            create_delay: Duration::ZERO,
            numeric_id: false,
        }
    }
}

#[derive(Deserialize)]
struct PageQuery {
    page: Option<u64>,
}

fn authorized(headers: &HeaderMap) -> bool {
    headers.get("x-api-key").and_then(|v| v.to_str().ok()) == Some(API_KEY)
}

async fn list_users(
    State(mock): State<Arc<MockApi>>,
    headers: HeaderMap,
    Query(query): Query<PageQuery>,
) -> Result<Json<Value>, StatusCode> {
    if !authorized(&headers) {
        return Err(StatusCode::UNAUTHORIZED);
    }
    let page = query.page.unwrap_or(1).max(1);
    if mock.broken_page == Some(page) {
        return Err(StatusCode::INTERNAL_SERVER_ERROR);
    }

    let total_pages = (mock.users + mock.per_page - 1) / mock.per_page;
    let start = (page as usize - 1) * mock.per_page;
    let end = (start + mock.per_page).min(mock.users);
    let data: Vec<Value> = (start..end)
        .map(|i| {
            let last_name = if mock.duplicate_last_names {
                "Smith"
            } else {
                LAST_NAMES[i % LAST_NAMES.len()]
            };
            json!({
                "id": i + 1,
                "email": format!("user{}@reqres.in", i + 1),
                "first_name": format!("User{}", i + 1),
                "last_name": last_name,
                "avatar": format!("https://reqres.in/img/faces/{}-image.jpg", i + 1),
            })
        })
        .collect();

    Ok(Json(json!({
        "page": page,
        "per_page": mock.per_page,
        "total": mock.reported_total.unwrap_or(mock.users as u64),
        "total_pages": total_pages,
        "data": data,
    })))
}

async fn create_user(
    State(mock): State<Arc<MockApi>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    if !authorized(&headers) {
        return (StatusCode::UNAUTHORIZED, Json(json!({ "error": "missing api key" })));
    }
    if !mock.create_delay.is_zero() {
        tokio::time::sleep(mock.create_delay).await;
    }
    let id = if mock.numeric_id { json!(481) } else { json!("481") };
    (
        StatusCode::CREATED,
        Json(json!({
            "name": body["name"],
            "job": body["job"],
            "id": id,
            "createdAt": chrono::Utc::now().to_rfc3339(),
        })),
    )
}

/// Serve the mock on an ephemeral port, returning its base URL
pub async fn spawn_api(mock: MockApi) -> String {
    let app = Router::new()
        .route("/api/users", get(list_users).post(create_user))
        .with_state(Arc::new(mock));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

pub fn api_config(url: &str) -> ApiConfig {
    ApiConfig {
        url: url.to_string(),
        headers: BTreeMap::from([("x-api-key".to_string(), API_KEY.to_string())]),
    }
}
