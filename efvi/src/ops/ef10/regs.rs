//! EF10 register offsets and record layouts.

use crate::codec::{BitField, FieldTable};

/// Bumped whenever a field below moves.
pub const LAYOUT_VERSION: u32 = 5;

// ═══════════════════════════════════════════════════════════════════════════
// REGISTERS
// ═══════════════════════════════════════════════════════════════════════════

pub const EVQ_RPTR_REG: usize = 0x400;
pub const EVQ_TMR_REG: usize = 0x420;
pub const RX_DESC_UPD_REG: usize = 0x830;
pub const TX_DESC_UPD_REG: usize = 0xa10;

/// Indirect read-pointer write: selects which half `EVQ_IND_RPTR` carries.
pub const EVQ_IND_RPTR_FLAGS: BitField = BitField::new(13, 3);
pub const EVQ_IND_RPTR: BitField = BitField::new(0, 13);
pub const EVQ_IND_RPTR_FLAGS_HIGH: u64 = 1;
pub const EVQ_IND_RPTR_FLAGS_LOW: u64 = 0;

pub const TIMER_MODE: BitField = BitField::new(14, 2);
pub const TIMER_VAL: BitField = BitField::new(0, 14);

/// Default timer tick when firmware does not report one.
pub const TIMER_QUANTUM_NS: u32 = 6144;

/// RX doorbell "magic" command form, used for packed-stream credits.
pub const RX_DESC_MAGIC_DOORBELL: BitField = BitField::bit(11);
pub const RX_DESC_MAGIC_CMD: BitField = BitField::new(8, 3);
pub const RX_DESC_MAGIC_DATA: BitField = BitField::new(0, 8);
pub const RX_DESC_MAGIC_CMD_PS_CREDITS: u64 = 0;

/// RX prefix bytes when timestamps are enabled.
pub const RX_PREFIX_SIZE: u32 = 14;

// ═══════════════════════════════════════════════════════════════════════════
// EVENTS
// ═══════════════════════════════════════════════════════════════════════════

pub const EV_CODE: BitField = BitField::new(60, 4);

pub const EV_CODE_RX: u64 = 0;
pub const EV_CODE_TX: u64 = 2;
pub const EV_CODE_DRIVER: u64 = 5;
pub const EV_CODE_DRV_GEN: u64 = 7;

pub const DRIVER_SUBCODE: BitField = BitField::new(56, 4);
pub const DRIVER_SUBDATA: BitField = BitField::new(0, 14);
pub const DRIVER_SUBCODE_TIMER: u64 = 3;

pub const DRV_GEN_DATA: BitField = BitField::new(0, 32);

pub const RX_BYTES: BitField = BitField::new(0, 14);
pub const RX_MAC_CLASS: BitField = BitField::bit(14);
pub const RX_CONT: BitField = BitField::bit(15);
pub const RX_ECRC_ERR: BitField = BitField::bit(29);
pub const RX_IPCKSUM_ERR: BitField = BitField::bit(30);
pub const RX_TCPUDP_CKSUM_ERR: BitField = BitField::bit(31);
pub const RX_QLABEL: BitField = BitField::new(32, 5);
pub const RX_CRC0_ERR: BitField = BitField::bit(37);
pub const RX_CRC1_ERR: BitField = BitField::bit(38);
pub const RX_ETH_TAG_CLASS: BitField = BitField::new(39, 3);
pub const RX_L3_CLASS: BitField = BitField::new(42, 3);
pub const RX_L4_CLASS: BitField = BitField::new(45, 3);
pub const RX_DSC_PTR_LBITS: BitField = BitField::new(48, 4);
pub const RX_EV_ROTATE: BitField = BitField::bit(55);
pub const RX_DROP_EVENT: BitField = BitField::bit(58);

pub const TX_DESCR_INDX: BitField = BitField::new(0, 16);
pub const TX_QLABEL: BitField = BitField::new(32, 5);

// ═══════════════════════════════════════════════════════════════════════════
// DESCRIPTORS
// ═══════════════════════════════════════════════════════════════════════════

pub const RX_KER_BYTE_CNT: BitField = BitField::new(48, 14);
pub const RX_KER_BUF_ADDR: BitField = BitField::new(0, 48);

pub const TX_KER_TYPE: BitField = BitField::bit(63);
pub const TX_KER_CONT: BitField = BitField::bit(62);
pub const TX_KER_BYTE_CNT: BitField = BitField::new(48, 14);
pub const TX_KER_BUF_ADDR: BitField = BitField::new(0, 48);

// ═══════════════════════════════════════════════════════════════════════════
// PACKED STREAM PREFIX
// ═══════════════════════════════════════════════════════════════════════════

pub const PS_PREFIX_TSTAMP: BitField = BitField::new(0, 32);
pub const PS_PREFIX_CAP_LEN: BitField = BitField::new(32, 16);
pub const PS_PREFIX_ORIG_LEN: BitField = BitField::new(48, 16);
pub const PS_PREFIX_SIZE: usize = 8;

// ═══════════════════════════════════════════════════════════════════════════
// TABLES
// ═══════════════════════════════════════════════════════════════════════════

pub const RX_EVENT: FieldTable = FieldTable {
    name: "ef10 rx event",
    words: 2,
    fields: &[
        ("bytes", RX_BYTES),
        ("mac_class", RX_MAC_CLASS),
        ("cont", RX_CONT),
        ("ecrc_err", RX_ECRC_ERR),
        ("ipcksum_err", RX_IPCKSUM_ERR),
        ("tcpudp_cksum_err", RX_TCPUDP_CKSUM_ERR),
        ("qlabel", RX_QLABEL),
        ("crc0_err", RX_CRC0_ERR),
        ("crc1_err", RX_CRC1_ERR),
        ("eth_tag_class", RX_ETH_TAG_CLASS),
        ("l3_class", RX_L3_CLASS),
        ("l4_class", RX_L4_CLASS),
        ("dsc_ptr_lbits", RX_DSC_PTR_LBITS),
        ("ev_rotate", RX_EV_ROTATE),
        ("drop_event", RX_DROP_EVENT),
        ("ev_code", EV_CODE),
    ],
};

pub const TX_EVENT: FieldTable = FieldTable {
    name: "ef10 tx event",
    words: 2,
    fields: &[
        ("descr_indx", TX_DESCR_INDX),
        ("qlabel", TX_QLABEL),
        ("ev_code", EV_CODE),
    ],
};

pub const DRIVER_EVENT: FieldTable = FieldTable {
    name: "ef10 driver event",
    words: 2,
    fields: &[
        ("subdata", DRIVER_SUBDATA),
        ("subcode", DRIVER_SUBCODE),
        ("ev_code", EV_CODE),
    ],
};

pub const RX_DESC: FieldTable = FieldTable {
    name: "ef10 rx descriptor",
    words: 2,
    fields: &[("buf_addr", RX_KER_BUF_ADDR), ("byte_cnt", RX_KER_BYTE_CNT)],
};

pub const TX_DESC: FieldTable = FieldTable {
    name: "ef10 tx descriptor",
    words: 2,
    fields: &[
        ("buf_addr", TX_KER_BUF_ADDR),
        ("byte_cnt", TX_KER_BYTE_CNT),
        ("cont", TX_KER_CONT),
        ("type", TX_KER_TYPE),
    ],
};

pub const PS_PREFIX: FieldTable = FieldTable {
    name: "ef10 packed stream prefix",
    words: 2,
    fields: &[
        ("tstamp", PS_PREFIX_TSTAMP),
        ("cap_len", PS_PREFIX_CAP_LEN),
        ("orig_len", PS_PREFIX_ORIG_LEN),
    ],
};

pub static LAYOUTS: [FieldTable; 6] = [RX_EVENT, TX_EVENT, DRIVER_EVENT, RX_DESC, TX_DESC, PS_PREFIX];
