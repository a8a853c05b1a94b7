//! Falcon register offsets and record layouts.

use crate::codec::{BitField, FieldTable};

/// Bumped whenever a field below moves.
pub const LAYOUT_VERSION: u32 = 3;

// ═══════════════════════════════════════════════════════════════════════════
// REGISTERS
// ═══════════════════════════════════════════════════════════════════════════

pub const EVQ_RPTR_REG: usize = 0x400;
pub const TIMER_CMD_REG: usize = 0x420;
pub const RX_DESC_UPD_REG: usize = 0x830;
pub const TX_DESC_UPD_REG: usize = 0xa10;

pub const EVQ_RPTR: BitField = BitField::new(0, 15);

pub const TIMER_MODE: BitField = BitField::new(12, 2);
pub const TIMER_VAL: BitField = BitField::new(0, 12);

/// Timer tick.
pub const TIMER_QUANTUM_NS: u32 = 5000;

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

pub const RX_DESC_PTR: BitField = BitField::new(0, 12);
pub const RX_SOP: BitField = BitField::bit(15);
pub const RX_BYTE_CNT: BitField = BitField::new(16, 14);
pub const RX_PORT: BitField = BitField::bit(30);
pub const RX_JUMBO_CONT: BitField = BitField::bit(31);
pub const RX_Q_LABEL: BitField = BitField::new(32, 5);
pub const RX_MCAST_PKT: BitField = BitField::bit(39);
pub const RX_MCAST_HASH_MATCH: BitField = BitField::bit(40);
pub const RX_DESC_Q_EMPTY: BitField = BitField::bit(41);
pub const RX_HDR_TYPE: BitField = BitField::new(42, 2);
pub const RX_PKT_TYPE: BitField = BitField::new(44, 3);
pub const RX_TOBE_DISC: BitField = BitField::bit(47);
pub const RX_FRM_TRUNC: BitField = BitField::bit(49);
pub const RX_ETH_CRC_ERR: BitField = BitField::bit(50);
pub const RX_TCP_UDP_CHKSUM_ERR: BitField = BitField::bit(51);
pub const RX_IP_HDR_CHKSUM_ERR: BitField = BitField::bit(52);
pub const RX_IP_FRAG_ERR: BitField = BitField::bit(53);
pub const RX_BUF_OWNER_ID_ERR: BitField = BitField::bit(54);
pub const RX_PAUSE_FRM_ERR: BitField = BitField::bit(55);
pub const RX_PKT_OK: BitField = BitField::bit(56);

pub const TX_DESC_PTR: BitField = BitField::new(0, 12);
pub const TX_COMP: BitField = BitField::bit(12);
pub const TX_BUF_OWNER_ID_ERR: BitField = BitField::bit(14);
pub const TX_WQ_FF_FULL: BitField = BitField::bit(15);
pub const TX_PORT: BitField = BitField::bit(16);
pub const TX_Q_LABEL: BitField = BitField::new(32, 5);
pub const TX_PKT_TOO_BIG: BitField = BitField::bit(37);
pub const TX_PKT_ERR: BitField = BitField::bit(38);

// ═══════════════════════════════════════════════════════════════════════════
// DESCRIPTORS
// ═══════════════════════════════════════════════════════════════════════════

pub const RX_KER_BUF_SIZE: BitField = BitField::new(48, 14);
pub const RX_KER_BUF_REGION: BitField = BitField::new(46, 2);
pub const RX_KER_BUF_ADDR: BitField = BitField::new(0, 46);

pub const TX_KER_CONT: BitField = BitField::bit(62);
pub const TX_KER_BYTE_COUNT: BitField = BitField::new(48, 14);
pub const TX_KER_BUF_REGION: BitField = BitField::new(46, 2);
pub const TX_KER_BUF_ADDR: BitField = BitField::new(0, 46);

// ═══════════════════════════════════════════════════════════════════════════
// TABLES
// ═══════════════════════════════════════════════════════════════════════════

pub const RX_EVENT: FieldTable = FieldTable {
    name: "falcon rx event",
    words: 2,
    fields: &[
        ("desc_ptr", RX_DESC_PTR),
        ("sop", RX_SOP),
        ("byte_cnt", RX_BYTE_CNT),
        ("port", RX_PORT),
        ("jumbo_cont", RX_JUMBO_CONT),
        ("q_label", RX_Q_LABEL),
        ("mcast_pkt", RX_MCAST_PKT),
        ("mcast_hash_match", RX_MCAST_HASH_MATCH),
        ("desc_q_empty", RX_DESC_Q_EMPTY),
        ("hdr_type", RX_HDR_TYPE),
        ("pkt_type", RX_PKT_TYPE),
        ("tobe_disc", RX_TOBE_DISC),
        ("frm_trunc", RX_FRM_TRUNC),
        ("eth_crc_err", RX_ETH_CRC_ERR),
        ("tcp_udp_chksum_err", RX_TCP_UDP_CHKSUM_ERR),
        ("ip_hdr_chksum_err", RX_IP_HDR_CHKSUM_ERR),
        ("ip_frag_err", RX_IP_FRAG_ERR),
        ("buf_owner_id_err", RX_BUF_OWNER_ID_ERR),
        ("pause_frm_err", RX_PAUSE_FRM_ERR),
        ("pkt_ok", RX_PKT_OK),
        ("ev_code", EV_CODE),
    ],
};

pub const TX_EVENT: FieldTable = FieldTable {
    name: "falcon tx event",
    words: 2,
    fields: &[
        ("desc_ptr", TX_DESC_PTR),
        ("comp", TX_COMP),
        ("buf_owner_id_err", TX_BUF_OWNER_ID_ERR),
        ("wq_ff_full", TX_WQ_FF_FULL),
        ("port", TX_PORT),
        ("q_label", TX_Q_LABEL),
        ("pkt_too_big", TX_PKT_TOO_BIG),
        ("pkt_err", TX_PKT_ERR),
        ("ev_code", EV_CODE),
    ],
};

pub const DRIVER_EVENT: FieldTable = FieldTable {
    name: "falcon driver event",
    words: 2,
    fields: &[
        ("subdata", DRIVER_SUBDATA),
        ("subcode", DRIVER_SUBCODE),
        ("ev_code", EV_CODE),
    ],
};

pub const RX_DESC: FieldTable = FieldTable {
    name: "falcon rx descriptor",
    words: 2,
    fields: &[
        ("buf_addr", RX_KER_BUF_ADDR),
        ("buf_region", RX_KER_BUF_REGION),
        ("buf_size", RX_KER_BUF_SIZE),
    ],
};

pub const TX_DESC: FieldTable = FieldTable {
    name: "falcon tx descriptor",
    words: 2,
    fields: &[
        ("buf_addr", TX_KER_BUF_ADDR),
        ("buf_region", TX_KER_BUF_REGION),
        ("byte_count", TX_KER_BYTE_COUNT),
        ("cont", TX_KER_CONT),
    ],
};

pub static LAYOUTS: [FieldTable; 5] = [RX_EVENT, TX_EVENT, DRIVER_EVENT, RX_DESC, TX_DESC];
