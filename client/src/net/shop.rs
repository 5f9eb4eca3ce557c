//! Catalog, cart, and order REST calls.
//!
//! All endpoints live under `{server}/api` and return the envelope's `data`.
//! List endpoints treat an absent `data` as an empty list.

#[cfg(test)]
#[path = "shop_test.rs"]
mod shop_test;

use serde::Serialize;
use serde::de::DeserializeOwned;

use super::http::{ApiClient, ApiError};
use super::transport::{HttpRequest, Method, Transport};
use super::types::{
    CartItem, CartItemRequest, Category, ChangeOrderStatusRequest, ChangeProductStatusRequest, Farmer, Order,
    OrderRequest, Page, Product,
};

pub const DEFAULT_PAGE_SIZE: u32 = 10;

fn cart_item_endpoint(id: &str) -> String {
    format!("/cart-items/{id}")
}

fn order_endpoint(id: &str) -> String {
    format!("/orders/{id}")
}

fn product_endpoint(id: &str) -> String {
    format!("/products/{id}")
}

fn farmer_endpoint(id: &str) -> String {
    format!("/farmers/{id}")
}

/// Which side of the order is changing its status.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OrderActor {
    Consumer,
    Farmer,
}

impl OrderActor {
    fn change_status_path(self) -> &'static str {
        match self {
            Self::Consumer => "/orders/consumer/change-status",
            Self::Farmer => "/orders/farmer/change-status",
        }
    }
}

impl<T: Transport> ApiClient<T> {
    async fn list<R: DeserializeOwned>(&self, request: HttpRequest) -> Result<Vec<R>, ApiError> {
        self.data::<Option<Vec<R>>>(request).await.map(Option::unwrap_or_default)
    }

    fn get(&self, path: &str) -> HttpRequest {
        self.request(Method::Get, self.config().api_url(path))
    }

    fn send_json<B: Serialize + ?Sized>(&self, method: Method, path: &str, body: &B) -> Result<HttpRequest, ApiError> {
        self.request_json(method, self.config().api_url(path), body)
    }

    // =========================================================================
    // CART
    // =========================================================================

    /// `POST /api/cart-items`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] on failure.
    pub async fn add_cart_item(&self, body: &CartItemRequest) -> Result<CartItem, ApiError> {
        let request = self.send_json(Method::Post, "/cart-items", body)?;
        self.data(request).await
    }

    /// `GET /api/cart-items`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] on failure.
    pub async fn cart_items(&self) -> Result<Vec<CartItem>, ApiError> {
        self.list(self.get("/cart-items")).await
    }

    /// `PUT /api/cart-items/{id}/quantity?quantity=`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] on failure.
    pub async fn update_cart_quantity(&self, id: &str, quantity: u32) -> Result<CartItem, ApiError> {
        let url = self.config().api_url(&format!("{}/quantity", cart_item_endpoint(id)));
        let request = self.request(Method::Put, url).query("quantity", quantity);
        self.data(request).await
    }

    /// `DELETE /api/cart-items/{id}`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] on failure.
    pub async fn delete_cart_item(&self, id: &str) -> Result<(), ApiError> {
        let request = self.request(Method::Delete, self.config().api_url(&cart_item_endpoint(id)));
        self.execute(request).await.map(|_| ())
    }

    /// `DELETE /api/cart-items/clear`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] on failure.
    pub async fn clear_cart_items(&self) -> Result<(), ApiError> {
        let request = self.request(Method::Delete, self.config().api_url("/cart-items/clear"));
        self.execute(request).await.map(|_| ())
    }

    // =========================================================================
    // ORDERS
    // =========================================================================

    /// `POST /api/orders`. The backend may split one request into several
    /// orders, one per farmer.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] on failure.
    pub async fn create_order(&self, body: &OrderRequest) -> Result<Vec<Order>, ApiError> {
        let request = self.send_json(Method::Post, "/orders", body)?;
        self.list(request).await
    }

    /// `GET /api/orders`: the signed-in consumer's orders.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] on failure.
    pub async fn my_orders(&self) -> Result<Vec<Order>, ApiError> {
        self.list(self.get("/orders")).await
    }

    /// `GET /api/orders/{id}`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] on failure.
    pub async fn order(&self, id: &str) -> Result<Order, ApiError> {
        self.data(self.get(&order_endpoint(id))).await
    }

    /// `GET /api/orders/farmer`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] on failure.
    pub async fn farmer_orders(&self) -> Result<Vec<Order>, ApiError> {
        self.list(self.get("/orders/farmer")).await
    }

    /// `POST /api/orders/{consumer|farmer}/change-status`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] on failure.
    pub async fn change_order_status(
        &self,
        actor: OrderActor,
        body: &ChangeOrderStatusRequest,
    ) -> Result<(), ApiError> {
        let request = self.send_json(Method::Post, actor.change_status_path(), body)?;
        self.execute(request).await.map(|_| ())
    }

    // =========================================================================
    // PRODUCTS
    // =========================================================================

    /// `GET /api/products?page=&size=`: active products, public.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] on failure.
    pub async fn products(&self, page: u32, size: u32) -> Result<Page<Product>, ApiError> {
        let request = self.get("/products").query("page", page).query("size", size);
        self.data(request).await
    }

    /// `GET /api/products/{id}`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] on failure.
    pub async fn product(&self, id: &str) -> Result<Product, ApiError> {
        self.data(self.get(&product_endpoint(id))).await
    }

    /// `GET /api/products/farmer`: the current farmer's products.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] on failure.
    pub async fn farmer_products(&self) -> Result<Vec<Product>, ApiError> {
        self.list(self.get("/products/farmer")).await
    }

    /// `GET /api/products/admin`: every product regardless of status.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] on failure.
    pub async fn admin_products(&self) -> Result<Vec<Product>, ApiError> {
        self.list(self.get("/products/admin")).await
    }

    /// `POST /api/products`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] on failure.
    pub async fn create_product<B: Serialize + ?Sized>(&self, body: &B) -> Result<Product, ApiError> {
        let request = self.send_json(Method::Post, "/products", body)?;
        self.data(request).await
    }

    /// `PUT /api/products/{id}`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] on failure.
    pub async fn update_product<B: Serialize + ?Sized>(&self, id: &str, body: &B) -> Result<Product, ApiError> {
        let request = self.send_json(Method::Put, &product_endpoint(id), body)?;
        self.data(request).await
    }

    /// `DELETE /api/products/{id}`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] on failure.
    pub async fn delete_product(&self, id: &str) -> Result<(), ApiError> {
        let request = self.request(Method::Delete, self.config().api_url(&product_endpoint(id)));
        self.execute(request).await.map(|_| ())
    }

    /// `POST /api/products/admin/change-status`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] on failure.
    pub async fn change_product_status(&self, body: &ChangeProductStatusRequest) -> Result<(), ApiError> {
        let request = self.send_json(Method::Post, "/products/admin/change-status", body)?;
        self.execute(request).await.map(|_| ())
    }

    // =========================================================================
    // CATEGORIES + FARMERS
    // =========================================================================

    /// `GET /api/categories`: the category tree.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] on failure.
    pub async fn categories(&self) -> Result<Vec<Category>, ApiError> {
        self.list(self.get("/categories")).await
    }

    /// `GET /api/farmers/{id}`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] on failure.
    pub async fn farmer(&self, id: &str) -> Result<Farmer, ApiError> {
        self.data(self.get(&farmer_endpoint(id))).await
    }

    /// `GET /api/farmers/owner`: the farm owned by the signed-in user.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] on failure.
    pub async fn own_farmer(&self) -> Result<Farmer, ApiError> {
        self.data(self.get("/farmers/owner")).await
    }

    /// `GET /api/farmers`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] on failure.
    pub async fn farmers(&self) -> Result<Vec<Farmer>, ApiError> {
        self.list(self.get("/farmers")).await
    }
}
