use anstyle::*;

pub const HEADER: Style = AnsiColor::BrightGreen.on_default().effects(Effects::BOLD);
pub const USAGE: Style = AnsiColor::BrightGreen.on_default().effects(Effects::BOLD);
pub const LITERAL: Style = AnsiColor::BrightCyan.on_default().effects(Effects::BOLD);
pub const PLACEHOLDER: Style = AnsiColor::Cyan.on_default();
pub const ERROR: Style = AnsiColor::BrightRed.on_default().effects(Effects::BOLD);
pub const WARN: Style = AnsiColor::BrightYellow.on_default().effects(Effects::BOLD);
pub const NOTE: Style = AnsiColor::BrightCyan.on_default().effects(Effects::BOLD);
pub const GOOD: Style = AnsiColor::BrightGreen.on_default().effects(Effects::BOLD);
