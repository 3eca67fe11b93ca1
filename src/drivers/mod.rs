// Hardware drivers, chip-level and protocol-level, board-independent.
//
// Each module is generic over embedded-hal; pin assignments and bus
// wiring live in board/.

pub mod input;
pub mod qwstpad;
pub mod sdcard;
pub mod st7789;
pub mod storage;
pub mod strip;
