pub mod appsettings;
pub mod http;
pub mod sweep;

#[cfg(test)]
mod test_utils;
