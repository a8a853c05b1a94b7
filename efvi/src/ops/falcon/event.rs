//! Falcon event decoding.

use super::regs::*;
use crate::event::{DiscardReason, Event, RxFlags, TxErrorKind};
use crate::vi::Vi;

/// Decode one raw Falcon event.
pub fn decode(vi: &mut Vi, raw: [u32; 2]) -> Option<Event> {
    let code = EV_CODE.get_checked(&raw, 4, vi.checks);
    match code {
        EV_CODE_RX => decode_rx(vi, &raw),
        EV_CODE_TX => decode_tx(vi, &raw),
        EV_CODE_DRIVER => decode_driver(&raw),
        EV_CODE_DRV_GEN => Some(Event::Software {
            data: DRV_GEN_DATA.get(&raw) as u32,
        }),
        _ => {
            log::warn!("falcon: unknown event code {} ({:#010x}{:08x})", code, raw[1], raw[0]);
            None
        }
    }
}

fn decode_rx(vi: &mut Vi, raw: &[u32; 2]) -> Option<Event> {
    let q_id = RX_Q_LABEL.get_checked(raw, 5, vi.checks) as u32;
    let len = RX_BYTE_CNT.get_checked(raw, 14, vi.checks) as u32;

    let Some(rq_id) = vi.rxq.complete_one() else {
        log::warn!("falcon: rx event on q {} with no descriptor posted", q_id);
        return None;
    };

    let mut flags = RxFlags::empty();
    if RX_SOP.test(raw) {
        flags |= RxFlags::SOP;
    }
    let cont = RX_JUMBO_CONT.test(raw);
    if cont {
        flags |= RxFlags::CONT;
    }
    vi.rxq.in_jumbo = cont;

    let mcast = RX_MCAST_PKT.test(raw);
    let hash_match = RX_MCAST_HASH_MATCH.test(raw);
    if mcast {
        flags |= RxFlags::MCAST;
    }
    if hash_match {
        flags |= RxFlags::MATCH_MCAST;
    }

    if RX_PKT_OK.test(raw) {
        return Some(Event::Rx { q_id, rq_id, len, flags });
    }

    let reason = if RX_FRM_TRUNC.test(raw) {
        DiscardReason::Trunc
    } else if RX_ETH_CRC_ERR.test(raw) {
        DiscardReason::CrcBad
    } else if RX_TCP_UDP_CHKSUM_ERR.test(raw) || RX_IP_HDR_CHKSUM_ERR.test(raw) {
        DiscardReason::CsumBad
    } else if mcast && !hash_match {
        DiscardReason::McastMismatch
    } else {
        DiscardReason::Other
    };
    Some(Event::RxDiscard { q_id, rq_id, len, reason })
}

fn decode_tx(vi: &mut Vi, raw: &[u32; 2]) -> Option<Event> {
    let q_id = TX_Q_LABEL.get_checked(raw, 5, vi.checks) as u32;
    let ptr = TX_DESC_PTR.get_checked(raw, 12, vi.checks) as u32;
    let desc_id = ptr.wrapping_add(1) & vi.txq.mask();

    if TX_COMP.test(raw) {
        return Some(Event::Tx { q_id, desc_id });
    }

    let kind = if TX_BUF_OWNER_ID_ERR.test(raw) {
        TxErrorKind::BufOwner
    } else if TX_PKT_TOO_BIG.test(raw) {
        TxErrorKind::TooBig
    } else if TX_PKT_ERR.test(raw) {
        TxErrorKind::PktErr
    } else {
        TxErrorKind::Other
    };
    Some(Event::TxError { q_id, desc_id, kind })
}

fn decode_driver(raw: &[u32; 2]) -> Option<Event> {
    match DRIVER_SUBCODE.get(raw) {
        DRIVER_SUBCODE_TIMER => Some(Event::Timer {
            q_id: DRIVER_SUBDATA.get(raw) as u32,
        }),
        sub => {
            log::debug!("falcon: ignoring driver event subcode {}", sub);
            None
        }
    }
}
