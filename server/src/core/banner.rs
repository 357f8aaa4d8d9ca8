//! Startup banner

use super::config::is_all_interfaces;
use super::constants::APP_NAME;

/// Host shown to the user; wildcard binds are reachable on localhost
fn display_host(host: &str) -> &str {
    if is_all_interfaces(host) {
        "localhost"
    } else {
        host
    }
}

/// Print the startup banner with the API URLs
pub fn print_banner(host: &str, port: u16, database: &str, migrations_dir: Option<&str>) {
    let base = format!("http://{}:{}", display_host(host), port);
    const W: usize = 12;

    println!();
    println!(
        "  \x1b[1m\x1b[36m{}\x1b[0m \x1b[90mv{}\x1b[0m",
        APP_NAME,
        env!("CARGO_PKG_VERSION")
    );
    println!();
    println!("  \x1b[32m➜\x1b[0m  \x1b[1m{:<W$}\x1b[0m {}/beers/", "API:", base);
    println!("  \x1b[32m➜\x1b[0m  \x1b[1m{:<W$}\x1b[0m {}/health", "Health:", base);
    if host == "127.0.0.1" || host == "localhost" {
        println!(
            "  \x1b[90m➜  {:<W$} use --host 0.0.0.0 to expose\x1b[0m",
            "Network:"
        );
    }
    println!("  \x1b[90m➜  {:<W$} {}\x1b[0m", "Database:", database);
    if let Some(dir) = migrations_dir {
        println!("  \x1b[90m➜  {:<W$} {}\x1b[0m", "Migrations:", dir);
    }
    println!();
}
