//! EF10 event decoding.
//!
//! RX events may batch several descriptor completions. The event carries
//! only the low four bits of the descriptor pointer; the batch size is the
//! difference from the previous event's value.

use super::regs::*;
use crate::event::{DiscardReason, Event, RxFlags};
use crate::vi::Vi;

/// Decode one raw EF10 event.
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
            log::warn!("ef10: unknown event code {} ({:#010x}{:08x})", code, raw[1], raw[0]);
            None
        }
    }
}

fn decode_rx(vi: &mut Vi, raw: &[u32; 2]) -> Option<Event> {
    let q_id = RX_QLABEL.get_checked(raw, 5, vi.checks) as u32;

    if RX_DROP_EVENT.test(raw) {
        log::trace!("ef10: drop event on q {}", q_id);
        return None;
    }

    let lbits = RX_DSC_PTR_LBITS.get_checked(raw, 4, vi.checks) as u32;
    let n = lbits.wrapping_sub(vi.rxq.last_desc_lbits) & RX_DSC_PTR_LBITS.max_value() as u32;
    vi.rxq.last_desc_lbits = lbits;

    if vi.config.packed_stream() {
        let mut flags = RxFlags::empty();
        if RX_EV_ROTATE.test(raw) {
            flags |= RxFlags::PS_NEXT_BUFFER;
            vi.rxq.complete_one();
        }
        return Some(Event::RxPackedStream { q_id, n_pkts: n, flags });
    }

    if n == 0 {
        log::trace!("ef10: rx event on q {} completed nothing", q_id);
        return None;
    }

    let mut flags = RxFlags::empty();
    if !vi.rxq.in_jumbo {
        flags |= RxFlags::SOP;
    }
    let cont = RX_CONT.test(raw);
    if cont {
        flags |= RxFlags::CONT;
    }
    vi.rxq.in_jumbo = cont;
    if RX_MAC_CLASS.test(raw) {
        flags |= RxFlags::MCAST | RxFlags::MATCH_MCAST;
    }

    if n > 1 {
        let (first, n_descs) = vi.rxq.retire(n);
        if n_descs < n {
            log::warn!("ef10: rx event on q {} claims {} descriptors, {} posted", q_id, n, n_descs);
        }
        if n_descs == 0 {
            return None;
        }
        return Some(Event::RxMulti { q_id, first, n_descs, flags });
    }

    let Some(rq_id) = vi.rxq.complete_one() else {
        log::warn!("ef10: rx event on q {} with no descriptor posted", q_id);
        return None;
    };
    let len = RX_BYTES.get_checked(raw, 14, vi.checks) as u32 + vi.rx_prefix_len;

    let reason = if RX_ECRC_ERR.test(raw) || RX_CRC0_ERR.test(raw) || RX_CRC1_ERR.test(raw) {
        Some(DiscardReason::CrcBad)
    } else if RX_IPCKSUM_ERR.test(raw) || RX_TCPUDP_CKSUM_ERR.test(raw) {
        Some(DiscardReason::CsumBad)
    } else {
        None
    };

    Some(match reason {
        Some(reason) => Event::RxDiscard { q_id, rq_id, len, reason },
        None => Event::Rx { q_id, rq_id, len, flags },
    })
}

fn decode_tx(vi: &mut Vi, raw: &[u32; 2]) -> Option<Event> {
    let q_id = TX_QLABEL.get_checked(raw, 5, vi.checks) as u32;
    let index = TX_DESCR_INDX.get_checked(raw, 16, vi.checks) as u32;
    Some(Event::Tx {
        q_id,
        desc_id: index.wrapping_add(1) & vi.txq.mask(),
    })
}

fn decode_driver(raw: &[u32; 2]) -> Option<Event> {
    match DRIVER_SUBCODE.get(raw) {
        DRIVER_SUBCODE_TIMER => Some(Event::Timer {
            q_id: DRIVER_SUBDATA.get(raw) as u32,
        }),
        sub => {
            log::debug!("ef10: ignoring driver event subcode {}", sub);
            None
        }
    }
}
