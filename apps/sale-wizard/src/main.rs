//! # Sale Wizard Entry Point
//!
//! ```text
//! $ sale-wizard --config ./wizard.toml
//! Sale wizard. Type 'help' for commands.
//! [1/3] > customer 3 Ana Pérez
//! [1/3] > next
//! ══ Step 2. Products ══
//! [2/3] > search cuaderno
//! ```
//!
//! The actual setup is in lib.rs so it can be tested.

#[tokio::main]
async fn main() {
    if let Err(e) = sale_wizard::run().await {
        eprintln!("sale-wizard: {}", e);
        std::process::exit(1);
    }
}
