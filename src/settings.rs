// Device settings with persistent storage.
// Text-based key=value format in _SURVEY/SETTINGS.TXT; written with
// defaults on first boot so there is a template to edit.

use log::{info, warn};

use crate::board::action::LedProfile;
use crate::board::button::Button;
use crate::drivers::storage::{FileStore, StorageError};

pub const SETTINGS_FILE: &str = "SETTINGS.TXT";

const POLL_MS_MIN: u16 = 50;
const POLL_MS_MAX: u16 = 500;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SurveySettings {
    pub poll_ms: u16,            // gamepad poll / tick interval
    pub led_profile: LedProfile, // which buttons own the four LEDs
    pub review_button: Button,   // held at boot -> review mode
    pub led_feedback: bool,      // show the score as an LED level
}

impl Default for SurveySettings {
    fn default() -> Self {
        Self::defaults()
    }
}

impl SurveySettings {
    pub const fn defaults() -> Self {
        Self {
            poll_ms: 100,
            led_profile: LedProfile::Abxy,
            review_button: Button::Minus,
            led_feedback: true,
        }
    }

    fn sanitize(&mut self) {
        self.poll_ms = self.poll_ms.clamp(POLL_MS_MIN, POLL_MS_MAX);
    }

    pub fn parse(data: &[u8]) -> Self {
        let mut s = Self::defaults();
        for line in data.split(|&b| b == b'\n') {
            let line = trim(line);
            if line.is_empty() || line[0] == b'#' {
                continue;
            }
            if let Some(eq) = line.iter().position(|&b| b == b'=') {
                let key = trim(&line[..eq]);
                let val = trim(&line[eq + 1..]);
                s.apply(key, val);
            }
        }
        s.sanitize();
        s
    }

    fn apply(&mut self, key: &[u8], val: &[u8]) {
        match key {
            b"poll_ms" => {
                if let Some(v) = parse_u16(val) {
                    self.poll_ms = v;
                }
            }
            b"led_profile" => match LedProfile::from_name(val) {
                Some(p) => self.led_profile = p,
                None => warn!("settings: unknown led_profile"),
            },
            b"review_button" => match Button::from_name(val) {
                Some(b) => self.review_button = b,
                None => warn!("settings: unknown review_button"),
            },
            b"led_feedback" => {
                if let Some(v) = parse_u16(val) {
                    self.led_feedback = v != 0;
                }
            }
            _ => {} // unknown keys ignored
        }
    }

    pub fn write_txt(&self, buf: &mut [u8]) -> usize {
        let mut wr = TxtWriter::new(buf);
        wr.put(b"# survey-pad settings\n");
        wr.put(b"# lines starting with # are ignored\n\n");
        wr.kv_num(b"poll_ms", self.poll_ms);
        wr.kv_str(b"led_profile", self.led_profile.name().as_bytes());
        wr.kv_str(b"review_button", self.review_button.key().as_bytes());
        wr.kv_num(b"led_feedback", self.led_feedback as u16);
        wr.len()
    }

    /// Settings from the card. A missing file is created with defaults;
    /// any other failure falls back to defaults without touching the card.
    pub fn load<S: FileStore>(store: &S) -> Self {
        let mut buf = [0u8; 512];
        match store.read_chunk(SETTINGS_FILE, 0, &mut buf) {
            Ok(n) => {
                let s = Self::parse(&buf[..n]);
                info!(
                    "settings: poll={}ms leds={} review={}",
                    s.poll_ms,
                    s.led_profile.name(),
                    s.review_button
                );
                s
            }
            Err(StorageError::NotFound) => {
                let s = Self::defaults();
                if let Err(e) = s.save(store) {
                    warn!("settings: could not write defaults: {}", e);
                }
                s
            }
            Err(e) => {
                warn!("settings: read failed: {}, using defaults", e);
                Self::defaults()
            }
        }
    }

    pub fn save<S: FileStore>(&self, store: &S) -> Result<(), StorageError> {
        let mut buf = [0u8; 256];
        let n = self.write_txt(&mut buf);
        store.ensure_app_dir()?;
        store.write(SETTINGS_FILE, &buf[..n])?;
        info!("settings: saved {}", SETTINGS_FILE);
        Ok(())
    }
}

pub(crate) fn trim(s: &[u8]) -> &[u8] {
    let mut start = 0;
    let mut end = s.len();
    while start < end && matches!(s[start], b' ' | b'\t' | b'\r') {
        start += 1;
    }
    while end > start && matches!(s[end - 1], b' ' | b'\t' | b'\r') {
        end -= 1;
    }
    &s[start..end]
}

fn parse_u16(s: &[u8]) -> Option<u16> {
    if s.is_empty() {
        return None;
    }
    let mut val: u16 = 0;
    for &b in s {
        if !b.is_ascii_digit() {
            return None;
        }
        val = val.checked_mul(10)?.checked_add((b - b'0') as u16)?;
    }
    Some(val)
}

// cursor writer for the text representation
struct TxtWriter<'a> {
    buf: &'a mut [u8],
    pos: usize,
}

impl<'a> TxtWriter<'a> {
    fn new(buf: &'a mut [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    fn put(&mut self, data: &[u8]) {
        let n = data.len().min(self.buf.len() - self.pos);
        self.buf[self.pos..self.pos + n].copy_from_slice(&data[..n]);
        self.pos += n;
    }

    fn put_u16(&mut self, val: u16) {
        let mut digits = [0u8; 5];
        let mut i = 5;
        let mut v = val;
        loop {
            i -= 1;
            digits[i] = b'0' + (v % 10) as u8;
            v /= 10;
            if v == 0 {
                break;
            }
        }
        self.put(&digits[i..]);
    }

    fn kv_num(&mut self, key: &[u8], val: u16) {
        self.put(key);
        self.put(b"=");
        self.put_u16(val);
        self.put(b"\n");
    }

    fn kv_str(&mut self, key: &[u8], val: &[u8]) {
        self.put(key);
        self.put(b"=");
        self.put(val);
        self.put(b"\n");
    }

    fn len(&self) -> usize {
        self.pos
    }
}
