pub mod error;
pub mod gate_engine;
pub mod use_cases;

#[cfg(test)]
pub(crate) mod test_support;

pub use error::GateError;
pub use gate_engine::{GateEngine, GateInput};
pub use use_cases::{
    check_otp::{CheckOtpRequest, CheckOtpUseCase},
    login::LoginUseCase,
    logout::LogoutUseCase,
};
