pub mod fields;
pub mod outcome;
pub mod ports;
pub mod request;
pub mod response;
pub mod routing;
