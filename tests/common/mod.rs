//! Reference encoder modelling the tag firmware: a ring of 8 character demis,
//! a 16 character endstop in front of the cursor and an HMAC-MD5/MD5 digest
//! over the valid pair history.
#![allow(dead_code)]

use std::ops::Range;

use base64::engine::general_purpose::{URL_SAFE, URL_SAFE_NO_PAD};
use base64::Engine as _;
use hmac::{Hmac, Mac};
use md5::{Digest, Md5};

pub const FORMAT_TRH: u8 = 1;
pub const FORMAT_TEMPONLY: u8 = 2;

const DEMI_LEN: usize = 8;
const ZERO_DEMI: &str = "MDAwMDAw";
const ENDSTOP_DEMIS: usize = 2;

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Convert degrees C to a raw HDC2021 reading, truncating like the firmware.
pub fn temp_degc_to_raw(degc: f64) -> u16 {
    ((degc + 40.0) * 4096.0 / 165.0) as u16
}

/// Convert percent relative humidity to a raw HDC2021 reading.
pub fn rh_percent_to_raw(rhpc: f64) -> u16 {
    ((rhpc * 4096.0) / 100.0) as u16
}

fn pack(meas1: u16, meas2: u16) -> [u8; 3] {
    [
        ((meas1 >> 4) & 0xFF) as u8,
        ((meas2 >> 4) & 0xFF) as u8,
        (((meas1 & 0xF) << 4) | (meas2 & 0xF)) as u8,
    ]
}

#[derive(Debug, Clone)]
pub struct Encoder {
    pub secret_key: String,
    pub use_hmac: bool,
    pub format: u8,
    pub major_version: u16,
    pub legacy_tag: bool,
    pub split_status: bool,
    pub interval_minutes: u16,
    pub loopcount: u16,
    pub resets_all_time: u16,
    pub battery_raw: u8,
    pub reset_cause: u8,
    pub elapsed_minutes: u16,
    /// Ring length in demis, must be even
    pub ring_demis: usize,
    /// Every pair ever pushed, oldest first
    history: Vec<[u8; 3]>,
    tock_pending: bool,
}

/// Everything the encoder would write into the URL.
#[derive(Debug, Clone)]
pub struct Encoded {
    pub status: String,
    pub interval: String,
    pub circular: String,
    pub version: String,
    pub npairs: usize,
    /// Character ranges in `circular` holding valid pairs
    pub pair_ranges: Vec<Range<usize>>,
    /// Character range in `circular` holding only digest bits
    pub digest_range: Range<usize>,
}

impl Encoded {
    pub fn url(&self) -> String {
        format!(
            "https://plotsensor.com/?t={}&s=ABCDEFGH&v={}&x={}&q={}",
            self.interval, self.version, self.status, self.circular
        )
    }
}

impl Encoder {
    pub fn new(secret_key: &str, format: u8) -> Self {
        Encoder {
            secret_key: secret_key.to_string(),
            use_hmac: true,
            format,
            major_version: 2,
            legacy_tag: false,
            split_status: false,
            interval_minutes: 12,
            loopcount: 1,
            resets_all_time: 0,
            battery_raw: 100,
            reset_cause: 0,
            elapsed_minutes: 0,
            ring_demis: 16,
            history: Vec::new(),
            tock_pending: false,
        }
    }

    /// Push a temperature and humidity reading.
    pub fn push_trh(&mut self, temp_raw: u16, rh_raw: u16) {
        self.history.push(pack(temp_raw, rh_raw));
    }

    /// Push a temperature reading. Readings alternate between opening a new
    /// pair (rd1 left as 4095) and filling rd1 of the current pair.
    pub fn push_temp(&mut self, temp_raw: u16) {
        match (self.tock_pending, self.history.last_mut()) {
            (true, Some(last)) => {
                last[1] = ((temp_raw >> 4) & 0xFF) as u8;
                last[2] = (last[2] & 0xF0) | (temp_raw & 0xF) as u8;
                self.tock_pending = false;
            }
            _ => {
                self.history.push(pack(temp_raw, 0xFFF));
                self.tock_pending = true;
            }
        }
    }

    fn demis_written(&self) -> usize {
        (self.history.len() + 1) / 2
    }

    fn demis_kept(&self) -> usize {
        self.demis_written().min(self.ring_demis - ENDSTOP_DEMIS)
    }

    /// Pairs still held in the ring.
    pub fn npairs(&self) -> usize {
        self.history.len() - 2 * (self.demis_written() - self.demis_kept())
    }

    /// Valid pairs, newest first.
    pub fn valid_pairs(&self) -> Vec<[u8; 3]> {
        self.history.iter().rev().take(self.npairs()).copied().collect()
    }

    pub fn batv_resetcause(&self) -> u16 {
        (u16::from(self.battery_raw) << 8) | u16::from(self.reset_cause)
    }

    pub fn status_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(6);
        bytes.extend_from_slice(&self.loopcount.to_le_bytes());
        bytes.extend_from_slice(&self.resets_all_time.to_le_bytes());
        if self.split_status {
            bytes.push(self.battery_raw);
            bytes.push(self.reset_cause);
        } else {
            bytes.extend_from_slice(&self.batv_resetcause().to_le_bytes());
        }
        bytes
    }

    pub fn digest(&self, endmarkerpos: usize) -> Vec<u8> {
        let mut frame = Vec::new();
        for pair in self.valid_pairs() {
            frame.extend_from_slice(&pair);
        }
        frame.extend_from_slice(&self.loopcount.to_be_bytes());
        frame.extend_from_slice(&self.resets_all_time.to_be_bytes());
        frame.extend_from_slice(&self.batv_resetcause().to_be_bytes());
        frame.extend_from_slice(&(endmarkerpos as u16).to_be_bytes());

        if self.use_hmac {
            let mut mac = <Hmac<Md5> as Mac>::new_from_slice(self.secret_key.as_bytes())
                .expect("HMAC accepts any key length");
            mac.update(&frame);
            mac.finalize().into_bytes().to_vec()
        } else {
            Md5::digest(&frame).to_vec()
        }
    }

    fn version_tag(&self) -> String {
        if self.legacy_tag {
            format!("00{}{}", self.major_version, self.format)
        } else {
            let [hi, lo] = self.major_version.to_be_bytes();
            format!("00{}", URL_SAFE.encode([hi, lo, self.format]))
        }
    }

    pub fn encode(&self) -> Encoded {
        let status = URL_SAFE.encode(self.status_bytes());
        let interval = format!("{}.", URL_SAFE_NO_PAD.encode(self.interval_minutes.to_le_bytes()));
        let version = self.version_tag();

        let mut slots: Vec<String> = vec![ZERO_DEMI.to_string(); self.ring_demis];

        let written = self.demis_written();
        if written == 0 {
            // Initialised but nothing pushed: no endstop, no delimiter
            return Encoded {
                status,
                interval,
                circular: slots.concat(),
                version,
                npairs: 0,
                pair_ranges: Vec::new(),
                digest_range: 0..0,
            };
        }

        let kept = self.demis_kept();
        for demi in (written - kept)..written {
            let first = self.history[2 * demi];
            let second = self.history.get(2 * demi + 1).copied().unwrap_or([0, 0, 0]);
            slots[demi % self.ring_demis] =
                format!("{}{}", URL_SAFE.encode(first), URL_SAFE.encode(second));
        }

        let cursor = (written - 1) % self.ring_demis;
        let hash_slot = (cursor + 1) % self.ring_demis;
        let marker_slot = (cursor + 2) % self.ring_demis;
        let endmarkerpos = marker_slot * DEMI_LEN + DEMI_LEN - 1;

        let npairs = self.npairs();
        let mut hashn = self.digest(endmarkerpos)[..7].to_vec();
        hashn.extend_from_slice(&(npairs as u16).to_be_bytes());
        let hashn_b64 = URL_SAFE.encode(&hashn);
        let marker = URL_SAFE_NO_PAD.encode(self.elapsed_minutes.to_le_bytes());

        slots[hash_slot] = hashn_b64[..8].to_string();
        slots[marker_slot] = format!("{}{}~", &hashn_b64[8..], marker);

        // Valid pairs, newest first, located by slot
        let mut pair_ranges = Vec::new();
        for index in 0..npairs {
            let pair = self.history.len() - 1 - index;
            let slot = (pair / 2) % self.ring_demis;
            let start = slot * DEMI_LEN + (pair % 2) * 4;
            pair_ranges.push(start..start + 4);
        }
        let digest_start = hash_slot * DEMI_LEN;

        Encoded {
            status,
            interval,
            circular: slots.concat(),
            version,
            npairs,
            pair_ranges,
            digest_range: digest_start..digest_start + 8,
        }
    }
}
