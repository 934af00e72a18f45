//! Geohash encode/decode and cell size estimation.
//!
//! Standard base-32 geohash: ranges are bisected alternating longitude
//! first, five bits per output character, most significant bit first.
//! `decode` returns the midpoint of the final bisected ranges.

use pulse_types::GEOHASH_ALPHABET;

/// A decoded cell midpoint.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum GeoError {
    #[error("invalid geohash character '{0}'")]
    InvalidChar(char),
}

/// Encode a coordinate to a geohash of `precision` characters.
pub fn encode(lat: f64, lon: f64, precision: usize) -> String {
    let alphabet = GEOHASH_ALPHABET.as_bytes();
    let mut hash = String::with_capacity(precision);
    let mut idx = 0usize;
    let mut bit = 0u8;
    let mut even_bit = true;

    let (mut lat_min, mut lat_max) = (-90.0f64, 90.0f64);
    let (mut lon_min, mut lon_max) = (-180.0f64, 180.0f64);

    while hash.len() < precision {
        if even_bit {
            let lon_mid = (lon_min + lon_max) / 2.0;
            if lon >= lon_mid {
                idx = (idx << 1) + 1;
                lon_min = lon_mid;
            } else {
                idx <<= 1;
                lon_max = lon_mid;
            }
        } else {
            let lat_mid = (lat_min + lat_max) / 2.0;
            if lat >= lat_mid {
                idx = (idx << 1) + 1;
                lat_min = lat_mid;
            } else {
                idx <<= 1;
                lat_max = lat_mid;
            }
        }
        even_bit = !even_bit;

        bit += 1;
        if bit == 5 {
            hash.push(alphabet[idx] as char);
            bit = 0;
            idx = 0;
        }
    }

    hash
}

/// Decode a geohash to the midpoint of its cell.
pub fn decode(geohash: &str) -> Result<LatLng, GeoError> {
    let mut even_bit = true;
    let (mut lat_min, mut lat_max) = (-90.0f64, 90.0f64);
    let (mut lon_min, mut lon_max) = (-180.0f64, 180.0f64);

    for ch in geohash.chars().map(|c| c.to_ascii_lowercase()) {
        let bits = GEOHASH_ALPHABET
            .find(ch)
            .ok_or(GeoError::InvalidChar(ch))?;
        for n in (0..5).rev() {
            let bit = (bits >> n) & 1;
            if even_bit {
                let lon_mid = (lon_min + lon_max) / 2.0;
                if bit == 1 {
                    lon_min = lon_mid;
                } else {
                    lon_max = lon_mid;
                }
            } else {
                let lat_mid = (lat_min + lat_max) / 2.0;
                if bit == 1 {
                    lat_min = lat_mid;
                } else {
                    lat_max = lat_mid;
                }
            }
            even_bit = !even_bit;
        }
    }

    Ok(LatLng {
        lat: (lat_min + lat_max) / 2.0,
        lng: (lon_min + lon_max) / 2.0,
    })
}

/// Half of the larger cell dimension (meters) at a given precision.
///
/// Approximate values at the equator; no latitude correction. Precisions
/// outside the table fall back to the precision-7 value.
pub fn cell_radius_meters(precision: usize) -> f64 {
    // [precision]: (height, width) meters
    let (h, w) = match precision {
        1 => (5_000_000.0, 5_000_000.0),
        2 => (1_250_000.0, 625_000.0),
        3 => (156_000.0, 156_000.0),
        4 => (39_100.0, 19_500.0),
        5 => (4_890.0, 4_890.0),
        6 => (1_220.0, 610.0),
        8 => (38.2, 19.1),
        9 => (4.77, 4.77),
        10 => (1.19, 0.596),
        _ => (153.0, 153.0),
    };
    f64::max(h, w) / 2.0
}
