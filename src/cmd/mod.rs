//! CLI command implementations.
//!
//! | Module     | Commands handled |
//! |------------|------------------|
//! | `generate` | `Generate`       |
//! | `coach`    | `Coach`          |
//! | `services` | `Services`       |
//! | `config`   | `Config`         |

pub mod coach;
pub mod config;
pub mod credentials;
pub mod generate;
pub mod services;

pub use coach::cmd_coach;
pub use config::cmd_config;
pub use generate::{GenerateOptions, cmd_generate};
pub use services::cmd_services;
