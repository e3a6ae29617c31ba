//! Selector tables and route fragments of the storefront UI
//!
//! Elements are located by their `data-test` attribute; the constants below
//! are attribute values unless they end in `_CSS`.

/// Attribute carrying stable test identifiers
pub const TEST_ID_ATTR: &str = "data-test";

pub mod routes {
    pub const LOGIN: &str = "/";
    pub const INVENTORY: &str = "/inventory.html";
    pub const CART: &str = "/cart.html";
    pub const CHECKOUT_STEP_ONE: &str = "/checkout-step-one.html";
    pub const CHECKOUT_STEP_TWO: &str = "/checkout-step-two.html";
    pub const CHECKOUT_COMPLETE: &str = "/checkout-complete.html";
}

pub mod login {
    pub const USERNAME: &str = "username";
    pub const PASSWORD: &str = "password";
    pub const SUBMIT: &str = "login-button";
}

pub mod inventory {
    pub const ITEM: &str = "inventory-item";
    pub const NAME: &str = "inventory-item-name";
    pub const DESCRIPTION: &str = "inventory-item-description";
    pub const DESC: &str = "inventory-item-desc";
    pub const PRICE: &str = "inventory-item-price";
    pub const IMG_CSS: &str = "img.inventory_item_img";
    pub const BUTTON_CSS: &str = "button";

    pub const ADD_TO_CART_TEXT: &str = "Add to cart";
    pub const REMOVE_TEXT: &str = "Remove";

    /// Per-product add button, keyed by product slug
    pub fn add_to_cart(slug: &str) -> String {
        format!("add-to-cart-{}", slug)
    }

    /// Per-product remove button, keyed by product slug
    pub fn remove(slug: &str) -> String {
        format!("remove-{}", slug)
    }
}

pub mod cart {
    pub const LINK: &str = "shopping-cart-link";
    pub const BADGE: &str = "shopping-cart-badge";
    pub const LIST: &str = "cart-list";
    pub const CONTINUE_SHOPPING: &str = "continue-shopping";
    pub const CHECKOUT: &str = "checkout";
}

pub mod checkout {
    pub const FIRST_NAME: &str = "firstName";
    pub const LAST_NAME: &str = "lastName";
    pub const POSTAL_CODE: &str = "postalCode";
    pub const CONTINUE: &str = "continue";
    pub const CANCEL: &str = "cancel";
}

pub mod overview {
    pub const SUBTOTAL: &str = "subtotal-label";
    pub const TAX: &str = "tax-label";
    pub const TOTAL: &str = "total-label";
    pub const FINISH: &str = "finish";
}

pub mod complete {
    pub const CONTAINER: &str = "checkout-complete-container";
    pub const IMG: &str = "pony-express";
    pub const HEADER: &str = "complete-header";
    pub const BACK_HOME: &str = "back-to-products";

    pub const THANK_YOU: &str = "Thank you for your order!";
}
