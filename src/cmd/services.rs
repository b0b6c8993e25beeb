//! `daybrief services`

use console::style;
use daybrief::services::ServiceKey;

pub fn cmd_services() {
    println!();
    println!("Available services");
    println!("==================");
    println!();
    for service in ServiceKey::ALL {
        println!(
            "  {:<12} {}",
            style(service.as_str()).cyan(),
            service.display_name()
        );
    }
    println!();
    println!("Use: daybrief generate -s gmail -s calendar");
    println!();
}
