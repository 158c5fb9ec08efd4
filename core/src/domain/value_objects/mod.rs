//! Value objects: request and response payloads of the operation surface

pub mod requests;
pub mod responses;

pub use requests::{
    validation_error, EmailRequest, LinkVerifyRequest, LoginRequest, LogoutRequest,
    PasswordResetFinishRequest, PhoneOtpRequest, RefreshRequest, ResendOtpRequest,
    SocialLoginRequest, TokenExchangeRequest,
};
pub use responses::{LinkDispatchAck, OtpDispatchAck, ResetLinkCheck};
