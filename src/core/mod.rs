/// Cart accumulator used at checkout
pub mod cart;
/// Menu category list document
pub mod category;
/// Upload downscaling and recompression
pub mod image;
/// Installable-app manifest and icons
pub mod manifest;
/// Menu item CRUD
pub mod menu;
/// Exact price parsing and cent arithmetic
pub mod money;
/// Offline worker script
pub mod offline;
/// Checkout and the order status workflow
pub mod order;
/// Order dashboard counts
pub mod report;
/// About, contact and logo documents
pub mod site;
/// Customer follow-up deep links
pub mod whatsapp;
