//! PrediMaint site backend - binary entry point
//! Delegates to the library for all app logic.

#[tokio::main]
async fn main() {
    predimaint_backend::run().await;
}
