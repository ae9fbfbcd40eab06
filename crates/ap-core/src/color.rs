use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// RGB triple, 8 bits per channel.
///
/// Serialized as a string (`"#1e1e2e"`, `"30,30,46"`, `"white"`, `"black"`).
///
/// # Example
/// ```
/// use ap_core::color::Rgb;
/// let c: Rgb = "#ff8000".parse().unwrap();
/// assert_eq!(c, Rgb(255, 128, 0));
/// assert_eq!(c.to_string(), "#ff8000");
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    /// Pure white.
    pub const WHITE: Self = Self(255, 255, 255);
    /// Pure black.
    pub const BLACK: Self = Self(0, 0, 0);

    /// Average-channel intensity `(r + g + b) / 3`, integer division.
    ///
    /// # Example
    /// ```
    /// use ap_core::color::Rgb;
    /// assert_eq!(Rgb(255, 255, 255).intensity(), 255);
    /// assert_eq!(Rgb(10, 20, 31).intensity(), 20);
    /// ```
    #[inline(always)]
    #[must_use]
    pub fn intensity(self) -> u8 {
        ((u16::from(self.0) + u16::from(self.1) + u16::from(self.2)) / 3) as u8
    }

    /// True when every channel is zero.
    #[inline(always)]
    #[must_use]
    pub fn is_zero(self) -> bool {
        self.0 == 0 && self.1 == 0 && self.2 == 0
    }

    /// Channels as an array, in R, G, B order.
    #[inline(always)]
    #[must_use]
    pub fn to_array(self) -> [u8; 3] {
        [self.0, self.1, self.2]
    }
}

impl FromStr for Rgb {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        match s.to_ascii_lowercase().as_str() {
            "white" => return Ok(Self::WHITE),
            "black" => return Ok(Self::BLACK),
            _ => {}
        }

        if let Some(hex) = s.strip_prefix('#') {
            if hex.len() != 6 || !hex.is_ascii() {
                return Err(CoreError::Config(format!("couleur hexadécimale invalide : {s}")));
            }
            let channel = |i: usize| {
                u8::from_str_radix(&hex[i..i + 2], 16)
                    .map_err(|_| CoreError::Config(format!("couleur hexadécimale invalide : {s}")))
            };
            return Ok(Self(channel(0)?, channel(2)?, channel(4)?));
        }

        let parts: Vec<&str> = s.split(',').map(str::trim).collect();
        if let [r, g, b] = parts.as_slice() {
            let channel = |v: &str| {
                v.parse::<u8>()
                    .map_err(|_| CoreError::Config(format!("composante invalide '{v}' dans {s}")))
            };
            return Ok(Self(channel(r)?, channel(g)?, channel(b)?));
        }

        Err(CoreError::Config(format!("couleur non reconnue : {s}")))
    }
}

impl TryFrom<String> for Rgb {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Rgb> for String {
    fn from(value: Rgb) -> Self {
        value.to_string()
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.0, self.1, self.2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_all_notations() {
        assert_eq!("white".parse::<Rgb>().unwrap(), Rgb::WHITE);
        assert_eq!(" Black ".parse::<Rgb>().unwrap(), Rgb::BLACK);
        assert_eq!("#1E1E2E".parse::<Rgb>().unwrap(), Rgb(30, 30, 46));
        assert_eq!("30, 30,46".parse::<Rgb>().unwrap(), Rgb(30, 30, 46));
    }

    #[test]
    fn rejects_garbage() {
        for bad in ["", "#12345", "#gg0000", "1,2", "256,0,0", "red", "#ffé000"] {
            assert!(bad.parse::<Rgb>().is_err(), "{bad:?} aurait dû échouer");
        }
    }

    #[test]
    fn intensity_truncates() {
        assert_eq!(Rgb(0, 0, 0).intensity(), 0);
        assert_eq!(Rgb(1, 1, 0).intensity(), 0);
        assert_eq!(Rgb(255, 0, 0).intensity(), 85);
    }
}
