//! Browser entry point served by trunk.

/// Installs the panic hook, then mounts the page widgets.
fn main() {
    // Set the panic hook to log detailed errors to the console
    console_error_panic_hook::set_once();
    site_ui::boot();
}
