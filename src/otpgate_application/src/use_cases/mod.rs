pub mod check_otp;
pub mod login;
pub mod logout;
