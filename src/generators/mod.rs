//! Generation handlers
//!
//! Pure, single-pass functions behind the MCP tools and the REST routes.
//! Each takes a typed parameter struct and returns a serializable record, or
//! a [`ToolkitError::Generation`](crate::error::ToolkitError::Generation)
//! describing why the input was rejected.

pub mod encoding;
pub mod identifiers;
pub mod palette;
pub mod password;
pub mod qr;

pub use encoding::{convert_base64, Base64Operation, Base64Params, ConvertedText};
pub use identifiers::{generate_uuids, GeneratedUuids, UuidParams};
pub use palette::{generate_palette, GeneratedPalette, PaletteParams, PaletteType};
pub use password::{generate_password, GeneratedPassword, PasswordParams, Strength};
pub use qr::{
    generate_qr_code, generate_qr_data, GeneratedQrCode, GeneratedQrData, QrCodeParams,
    QrDataParams, QrDataType, QrFormat,
};
