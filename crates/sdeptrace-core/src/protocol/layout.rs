pub const LEAD_COMMAND: u8 = 0x10;
pub const LEAD_RESPONSE: u8 = 0x20;
pub const LEAD_ALERT: u8 = 0x40;
pub const LEAD_ERROR: u8 = 0x80;

pub const PAYLOAD_LEN_MASK: u8 = 0x1F;
pub const MORE_FLAG_BIT: u8 = 0x80;
