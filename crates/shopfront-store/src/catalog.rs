//! The fixed catalog inserted when the store is first created.

use chrono::Utc;
use shopfront_shared::ProductId;

use crate::models::Product;

/// Products seeded into an empty store.
pub fn default_catalog() -> Vec<Product> {
    [
        (
            "Gaming Laptop",
            "High-performance laptop for gaming and work",
            1299.99,
            "Electronics",
            10,
            "laptop_gaming",
        ),
        (
            "Wireless Mouse",
            "Ergonomic mouse with Bluetooth connectivity",
            29.99,
            "Accessories",
            50,
            "mouse",
        ),
        (
            "Mechanical Keyboard",
            "RGB mechanical keyboard for gaming",
            89.99,
            "Accessories",
            30,
            "keyboard",
        ),
        (
            "27-inch Monitor",
            "4K UHD monitor with IPS panel",
            399.99,
            "Electronics",
            15,
            "monitor",
        ),
        (
            "Bluetooth Headphones",
            "Wireless headphones with noise cancellation",
            149.99,
            "Audio",
            25,
            "headphones",
        ),
        (
            "HD Webcam",
            "Full HD 1080p web camera",
            59.99,
            "Accessories",
            40,
            "webcam",
        ),
        (
            "1TB SSD",
            "High-speed NVMe solid-state drive",
            119.99,
            "Storage",
            20,
            "ssd",
        ),
        (
            "WiFi 6 Router",
            "Latest-generation router with WiFi 6",
            179.99,
            "Networking",
            12,
            "router",
        ),
    ]
    .into_iter()
    .map(|(name, description, price, category, stock, image_url)| Product {
        id: ProductId::UNSET,
        name: name.to_string(),
        description: description.to_string(),
        price,
        category: category.to_string(),
        stock,
        image_url: image_url.to_string(),
        is_available: true,
        created_at: Utc::now(),
    })
    .collect()
}
