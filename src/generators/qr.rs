//! QR code rendering and QR payload formatting

use std::io::Cursor;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::{DynamicImage, ImageFormat, Luma};
use qrcode::render::{svg, unicode};
use qrcode::{EcLevel, QrCode};
use serde::{Deserialize, Serialize};

use crate::error::{Result, ToolkitError};

pub const MIN_QR_WIDTH: u32 = 100;
pub const MAX_QR_WIDTH: u32 = 1000;

/// Output rendering for `generate-qr-code`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QrFormat {
    #[default]
    Png,
    Svg,
    Terminal,
}

/// Error correction level, mirroring the four QR levels
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub enum ErrorCorrection {
    L,
    #[default]
    M,
    Q,
    H,
}

impl From<ErrorCorrection> for EcLevel {
    fn from(level: ErrorCorrection) -> Self {
        match level {
            ErrorCorrection::L => EcLevel::L,
            ErrorCorrection::M => EcLevel::M,
            ErrorCorrection::Q => EcLevel::Q,
            ErrorCorrection::H => EcLevel::H,
        }
    }
}

/// Input for `generate-qr-code`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QrCodeParams {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub format: QrFormat,
    #[serde(default)]
    pub error_correction_level: ErrorCorrection,
    #[serde(default = "default_width")]
    pub width: u32,
}

fn default_width() -> u32 {
    200
}

/// Output of `generate-qr-code`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedQrCode {
    pub qr_code: String,
    pub format: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<&'static str>,
    pub text: String,
}

/// Render `params.text` as a QR code
pub fn generate_qr_code(params: &QrCodeParams) -> Result<GeneratedQrCode> {
    if params.text.is_empty() {
        return Err(ToolkitError::Generation(
            "Text parameter is required".to_string(),
        ));
    }
    if !(MIN_QR_WIDTH..=MAX_QR_WIDTH).contains(&params.width) {
        return Err(ToolkitError::Generation(format!(
            "width must be between {} and {}",
            MIN_QR_WIDTH, MAX_QR_WIDTH
        )));
    }

    let code = QrCode::with_error_correction_level(
        params.text.as_bytes(),
        params.error_correction_level.into(),
    )
    .map_err(qr_failure)?;

    let (qr_code, format, mime_type) = match params.format {
        QrFormat::Png => {
            let img = code
                .render::<Luma<u8>>()
                .min_dimensions(params.width, params.width)
                .quiet_zone(true)
                .build();
            let mut png = Vec::new();
            DynamicImage::ImageLuma8(img)
                .write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
                .map_err(qr_failure)?;
            (STANDARD.encode(&png), "base64", Some("image/png"))
        }
        QrFormat::Svg => {
            let doc = code
                .render::<svg::Color>()
                .min_dimensions(params.width, params.width)
                .dark_color(svg::Color("#000000"))
                .light_color(svg::Color("#ffffff"))
                .build();
            (doc, "svg", None)
        }
        QrFormat::Terminal => {
            let art = code
                .render::<unicode::Dense1x2>()
                .dark_color(unicode::Dense1x2::Light)
                .light_color(unicode::Dense1x2::Dark)
                .build();
            (art, "terminal", None)
        }
    };

    Ok(GeneratedQrCode {
        qr_code,
        format,
        mime_type,
        text: params.text.clone(),
    })
}

fn qr_failure(err: impl std::fmt::Display) -> ToolkitError {
    ToolkitError::Generation(format!("Failed to generate QR code: {}", err))
}

/// Payload kind for `generate-qr-data`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QrDataType {
    Wifi,
    Contact,
    Url,
    Text,
}

/// WiFi authentication type
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub enum WifiSecurity {
    #[default]
    #[serde(rename = "WPA")]
    Wpa,
    #[serde(rename = "WEP")]
    Wep,
    #[serde(rename = "nopass")]
    NoPass,
}

impl WifiSecurity {
    fn as_str(self) -> &'static str {
        match self {
            WifiSecurity::Wpa => "WPA",
            WifiSecurity::Wep => "WEP",
            WifiSecurity::NoPass => "nopass",
        }
    }
}

/// Fields used by the various payload kinds; each kind reads its own subset
#[derive(Debug, Clone, Default, Deserialize)]
pub struct QrDataFields {
    pub ssid: Option<String>,
    pub password: Option<String>,
    pub security: Option<WifiSecurity>,
    pub name: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub content: Option<String>,
}

/// Input for `generate-qr-data`
#[derive(Debug, Clone, Deserialize)]
pub struct QrDataParams {
    #[serde(rename = "type")]
    pub data_type: QrDataType,
    pub data: QrDataFields,
}

/// Output of `generate-qr-data`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedQrData {
    pub qr_data: String,
    #[serde(rename = "type")]
    pub data_type: QrDataType,
}

/// Format the text a QR scanner interprets as WiFi credentials, a vCard, or plain content
pub fn generate_qr_data(params: &QrDataParams) -> Result<GeneratedQrData> {
    let data = &params.data;
    let qr_data = match params.data_type {
        QrDataType::Wifi => {
            let ssid = data
                .ssid
                .as_deref()
                .filter(|s| !s.is_empty())
                .ok_or_else(|| {
                    ToolkitError::Generation("SSID is required for WiFi QR codes".to_string())
                })?;
            format!(
                "WIFI:T:{};S:{};P:{};H:false;;",
                data.security.unwrap_or_default().as_str(),
                ssid,
                data.password.as_deref().unwrap_or("")
            )
        }
        QrDataType::Contact => {
            let mut card = String::from("BEGIN:VCARD\nVERSION:3.0\n");
            for (prefix, value) in [
                ("FN", &data.name),
                ("TEL", &data.phone),
                ("EMAIL", &data.email),
            ] {
                if let Some(value) = value.as_deref().filter(|v| !v.is_empty()) {
                    card.push_str(&format!("{}:{}\n", prefix, value));
                }
            }
            card.push_str("END:VCARD");
            card
        }
        QrDataType::Url | QrDataType::Text => data.content.clone().unwrap_or_default(),
    };

    Ok(GeneratedQrData {
        qr_data,
        data_type: params.data_type,
    })
}
