// SD card over SPI with FAT volume manager
// No RTC on board; FAT timestamps count up from 2025-01-01 00:00
// using uptime, so files written in one session still sort.

use embedded_hal::delay::DelayNs;
use embedded_hal::spi::SpiDevice;
use embedded_sdmmc::{SdCard, TimeSource, Timestamp, VolumeManager};
use log::info;

use crate::kernel::wake;

#[derive(Default, Clone, Copy)]
pub struct UptimeClock;

impl TimeSource for UptimeClock {
    fn get_timestamp(&self) -> Timestamp {
        let secs = wake::uptime_secs();
        Timestamp {
            year_since_1970: 55,
            zero_indexed_month: 0,
            zero_indexed_day: ((secs / 86_400) % 28) as u8,
            hours: ((secs / 3600) % 24) as u8,
            minutes: ((secs / 60) % 60) as u8,
            seconds: (secs % 60) as u8,
        }
    }
}

// sd card initialization frequency (Hz).
pub const SD_INIT_FREQ_HZ: u32 = 400_000;

pub struct SdStorage<SPI, DELAY>
where
    SPI: SpiDevice,
    DELAY: DelayNs,
{
    pub volume_mgr: VolumeManager<SdCard<SPI, DELAY>, UptimeClock>,
}

impl<SPI, DELAY> SdStorage<SPI, DELAY>
where
    SPI: SpiDevice,
    DELAY: DelayNs,
{
    // Create SD storage, probing the card during construction.
    pub fn new(spi: SPI, delay: DELAY) -> Self {
        let sdcard = SdCard::new(spi, delay);

        // triggers the card init sequence (CMD0, CMD8, ACMD41, ...)
        match sdcard.num_bytes() {
            Ok(bytes) => info!("SD card: {} bytes ({} MB)", bytes, bytes / 1024 / 1024),
            Err(e) => info!("SD card probe failed: {:?}", e),
        }

        let volume_mgr = VolumeManager::new(sdcard, UptimeClock);
        Self { volume_mgr }
    }

    pub fn is_present(&self) -> bool {
        self.volume_mgr
            .open_volume(embedded_sdmmc::VolumeIdx(0))
            .is_ok()
    }
}
