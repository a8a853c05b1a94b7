//! End-to-end VI tests over heap-backed rings.
//!
//! The test plays the adapter: it writes raw event entries straight into the
//! event ring and reads doorbell/timer registers back from the register
//! window.

use efvi::codec::BitField;
use efvi::evq::EVENT_SIZE;
use efvi::packed_stream::{PS_DMA_START_OFFSET, PS_SPACE_PER_CREDIT};
use efvi::{
    DiscardReason, Error, Event, Generation, RxFlags, Strictness, Vi, ViConfig, ViFlags,
    ViResources,
};

// =============================================================================
// Helpers
// =============================================================================

fn config() -> ViConfig {
    ViConfig {
        rxq_entries: 512,
        txq_entries: 512,
        evq_entries: 1024,
        ..ViConfig::default()
    }
    .with_strictness(Strictness::Strict)
}

fn open(generation: Generation, config: ViConfig) -> Vi {
    let res = ViResources::alloc(&config).expect("alloc resources");
    Vi::open(generation.ops(), config, res).expect("open vi")
}

/// Build a raw event from field/value pairs.
fn raw(fields: &[(BitField, u64)]) -> [u32; 2] {
    let mut w = [0u32; 2];
    for &(field, value) in fields {
        field.set(&mut w, value, Strictness::Strict);
    }
    w
}

/// Write `ev` into event slot `index`, as the adapter would.
fn deliver(vi: &Vi, index: usize, ev: [u32; 2]) {
    vi.evq().ring().write_words(index * EVENT_SIZE, ev);
}

fn poll_all(vi: &mut Vi) -> Vec<Event> {
    let mut out = [Event::default(); 32];
    let n = vi.eventq_poll(&mut out);
    out[..n].to_vec()
}

// =============================================================================
// Falcon
// =============================================================================

mod falcon_events {
    use super::*;
    use efvi::ops::falcon::regs::*;

    fn rx_ok(len: u64) -> [u32; 2] {
        raw(&[
            (EV_CODE, EV_CODE_RX),
            (RX_BYTE_CNT, len),
            (RX_SOP, 1),
            (RX_PKT_OK, 1),
        ])
    }

    #[test]
    fn test_receive_round_trip() {
        let mut vi = open(Generation::Falcon, config());
        for id in 0..3 {
            vi.receive_init(0x10_0000 + id as u64 * 2048, id).unwrap();
        }
        vi.receive_push();
        assert_eq!(vi.io().read32(RX_DESC_UPD_REG), 3);
        assert_eq!(vi.receive_fill_level(), 3);

        deliver(&vi, 0, rx_ok(60));
        deliver(
            &vi,
            1,
            raw(&[(EV_CODE, EV_CODE_RX), (RX_BYTE_CNT, 64), (RX_ETH_CRC_ERR, 1)]),
        );

        let events = poll_all(&mut vi);
        assert_eq!(
            events,
            vec![
                Event::Rx { q_id: 0, rq_id: 0, len: 60, flags: RxFlags::SOP },
                Event::RxDiscard { q_id: 0, rq_id: 1, len: 64, reason: DiscardReason::CrcBad },
            ]
        );
        assert_eq!(vi.receive_fill_level(), 1);
        assert!(!vi.eventq_has_event());
    }

    #[test]
    fn test_transmit_completion() {
        let mut vi = open(Generation::Falcon, config());
        vi.transmit(0x2000, 100, 41).unwrap();
        vi.transmit(0x3000, 200, 42).unwrap();
        assert_eq!(vi.io().read32(TX_DESC_UPD_REG), 2);

        deliver(&vi, 0, raw(&[(EV_CODE, EV_CODE_TX), (TX_DESC_PTR, 1), (TX_COMP, 1)]));
        let events = poll_all(&mut vi);
        assert_eq!(events, vec![Event::Tx { q_id: 0, desc_id: 2 }]);

        let mut ids = [0u32; 8];
        assert_eq!(vi.transmit_unbundle(&events[0], &mut ids), 2);
        assert_eq!(&ids[..2], &[41, 42]);
        assert_eq!(vi.transmit_fill_level(), 0);
    }

    #[test]
    fn test_timer_and_software_events() {
        let mut vi = open(Generation::Falcon, config());
        deliver(
            &vi,
            0,
            raw(&[
                (EV_CODE, EV_CODE_DRIVER),
                (DRIVER_SUBCODE, DRIVER_SUBCODE_TIMER),
                (DRIVER_SUBDATA, 4),
            ]),
        );
        deliver(&vi, 1, raw(&[(EV_CODE, EV_CODE_DRV_GEN), (DRV_GEN_DATA, 0xabcd)]));

        assert_eq!(
            poll_all(&mut vi),
            vec![Event::Timer { q_id: 4 }, Event::Software { data: 0xabcd }]
        );
    }

    #[test]
    fn test_unknown_event_is_consumed_silently() {
        let mut vi = open(Generation::Falcon, config());
        deliver(&vi, 0, raw(&[(EV_CODE, 0xe)]));
        deliver(&vi, 1, raw(&[(EV_CODE, EV_CODE_DRV_GEN), (DRV_GEN_DATA, 1)]));
        assert_eq!(poll_all(&mut vi), vec![Event::Software { data: 1 }]);
        assert_eq!(vi.evq().read_index(), 2);
    }

    #[test]
    fn test_prime_writes_read_index() {
        let mut vi = open(Generation::Falcon, config());
        for i in 0..3 {
            deliver(&vi, i, raw(&[(EV_CODE, EV_CODE_DRV_GEN)]));
        }
        assert_eq!(poll_all(&mut vi).len(), 3);
        vi.eventq_prime();
        assert_eq!(vi.io().read32(EVQ_RPTR_REG), 3);
    }

    #[test]
    fn test_timer_prime_register() {
        let mut vi = open(Generation::Falcon, config());
        vi.timer_prime(10);
        // trigger-start, ceil(10000 / 5000) ticks
        assert_eq!(vi.io().read32(TIMER_CMD_REG), (2 << 12) | 2);
        vi.timer_clear();
        assert_eq!(vi.io().read32(TIMER_CMD_REG), 0);
    }
}

// =============================================================================
// EF10
// =============================================================================

mod ef10_events {
    use super::*;
    use efvi::ops::ef10::regs::*;

    fn rx(lbits: u64, bytes: u64) -> [u32; 2] {
        raw(&[(EV_CODE, EV_CODE_RX), (RX_DSC_PTR_LBITS, lbits), (RX_BYTES, bytes)])
    }

    #[test]
    fn test_single_then_batched_receive() {
        let mut vi = open(Generation::Ef10, config());
        for id in 0..6 {
            vi.receive_init(0x4_0000 + id as u64 * 2048, 100 + id).unwrap();
        }
        vi.receive_push();
        assert_eq!(vi.io().read32(RX_DESC_UPD_REG), 6);

        deliver(&vi, 0, rx(1, 128));
        deliver(&vi, 1, rx(4, 0));
        deliver(&vi, 2, rx(5, 256));

        let events = poll_all(&mut vi);
        assert_eq!(events.len(), 3);
        assert_eq!(
            events[0],
            Event::Rx { q_id: 0, rq_id: 100, len: 128, flags: RxFlags::SOP }
        );
        assert!(matches!(events[1], Event::RxMulti { n_descs: 3, .. }));
        assert_eq!(
            events[2],
            Event::Rx { q_id: 0, rq_id: 104, len: 256, flags: RxFlags::SOP }
        );

        let mut ids = [0u32; efvi::vi::RECEIVE_BATCH];
        assert_eq!(vi.receive_unbundle(&events[1], &mut ids), 3);
        assert_eq!(&ids[..3], &[101, 102, 103]);
        assert_eq!(vi.receive_fill_level(), 1);
    }

    #[test]
    fn test_batched_receive_reports_only_posted_descriptors() {
        let mut vi = open(Generation::Ef10, config());
        vi.receive(0x4_0000, 10).unwrap();
        vi.receive(0x4_0800, 11).unwrap();

        // Pointer jumps by five with only two descriptors outstanding.
        deliver(&vi, 0, rx(5, 0));
        let events = poll_all(&mut vi);
        assert_eq!(events.len(), 1);
        assert!(matches!(events[0], Event::RxMulti { first: 0, n_descs: 2, .. }));

        let mut ids = [0u32; efvi::vi::RECEIVE_BATCH];
        assert_eq!(vi.receive_unbundle(&events[0], &mut ids), 2);
        assert_eq!(&ids[..2], &[10, 11]);
        assert_eq!(vi.receive_fill_level(), 0);

        // Nothing left to retire: the event is dropped.
        deliver(&vi, 1, rx(9, 0));
        assert!(poll_all(&mut vi).is_empty());
        assert_eq!(vi.receive_fill_level(), 0);
    }

    #[test]
    fn test_rx_prefix_counts_toward_length() {
        let cfg = config().with_flags(ViFlags::RX_TIMESTAMPS);
        let mut vi = open(Generation::Ef10, cfg);
        vi.receive(0x8000, 7).unwrap();
        deliver(&vi, 0, rx(1, 60));
        assert_eq!(
            poll_all(&mut vi),
            vec![Event::Rx { q_id: 0, rq_id: 7, len: 60 + RX_PREFIX_SIZE, flags: RxFlags::SOP }]
        );
    }

    #[test]
    fn test_checksum_error_discards() {
        let mut vi = open(Generation::Ef10, config());
        vi.receive(0x8000, 9).unwrap();
        deliver(
            &vi,
            0,
            raw(&[
                (EV_CODE, EV_CODE_RX),
                (RX_DSC_PTR_LBITS, 1),
                (RX_BYTES, 90),
                (RX_TCPUDP_CKSUM_ERR, 1),
            ]),
        );
        assert_eq!(
            poll_all(&mut vi),
            vec![Event::RxDiscard { q_id: 0, rq_id: 9, len: 90, reason: DiscardReason::CsumBad }]
        );
    }

    #[test]
    fn test_torn_entry_is_deferred() {
        let mut vi = open(Generation::Ef10, config());
        let ev = raw(&[(EV_CODE, EV_CODE_DRV_GEN), (DRV_GEN_DATA, 77)]);

        // Only the low word has landed.
        vi.evq().ring().write32(0, ev[0]);
        assert!(poll_all(&mut vi).is_empty());
        assert!(!vi.eventq_has_event());
        assert_eq!(vi.evq().read_ptr(), 0);

        vi.evq().ring().write32(4, ev[1]);
        assert!(vi.eventq_has_event());
        assert_eq!(poll_all(&mut vi), vec![Event::Software { data: 77 }]);
        assert_eq!(vi.evq().read_ptr(), EVENT_SIZE as u32);
    }

    #[test]
    fn test_poll_respects_output_capacity() {
        let mut vi = open(Generation::Ef10, config());
        for i in 0..5 {
            deliver(&vi, i, raw(&[(EV_CODE, EV_CODE_DRV_GEN), (DRV_GEN_DATA, i as u64)]));
        }
        assert!(vi.eventq_has_many_events(5));
        assert!(!vi.eventq_has_many_events(6));

        let mut out = [Event::default(); 2];
        assert_eq!(vi.eventq_poll(&mut out), 2);
        assert_eq!(out[1], Event::Software { data: 1 });
        assert_eq!(poll_all(&mut vi).len(), 3);
    }

    #[test]
    fn test_event_ring_wraps() {
        let cfg = ViConfig { evq_entries: 512, ..config() };
        let mut vi = open(Generation::Ef10, cfg);
        for round in 0..3u64 {
            for i in 0..512 {
                deliver(&vi, i, raw(&[(EV_CODE, EV_CODE_DRV_GEN), (DRV_GEN_DATA, round)]));
            }
            let mut out = vec![Event::default(); 600];
            assert_eq!(vi.eventq_poll(&mut out), 512);
            assert_eq!(out[511], Event::Software { data: round as u32 });
            assert_eq!(vi.evq().read_index(), 0);
        }
    }

    #[test]
    fn test_prime_writes_low_half_last() {
        let mut vi = open(Generation::Ef10, config());
        for i in 0..3 {
            deliver(&vi, i, raw(&[(EV_CODE, EV_CODE_DRV_GEN)]));
        }
        poll_all(&mut vi);
        vi.eventq_prime();

        let mut expect = [0u32; 1];
        EVQ_IND_RPTR_FLAGS.set(&mut expect, EVQ_IND_RPTR_FLAGS_LOW, Strictness::Strict);
        EVQ_IND_RPTR.set(&mut expect, 3, Strictness::Strict);
        assert_eq!(vi.io().read32(EVQ_RPTR_REG), expect[0]);
    }

    #[test]
    fn test_timer_run_register() {
        let mut vi = open(Generation::Ef10, config());
        vi.timer_run(12);
        // immediate-start, ceil(12000 / 6144) ticks
        assert_eq!(vi.io().read32(EVQ_TMR_REG), (1 << 14) | 2);
        vi.timer_zero();
        assert_eq!(vi.io().read32(EVQ_TMR_REG), 1 << 14);
    }

    #[test]
    fn test_tx_event() {
        let mut vi = open(Generation::Ef10, config());
        vi.transmitv_init(&[(0x1000, 64), (0x2000, 64)], 5).unwrap();
        vi.transmit_init(0x3000, 64, 6).unwrap();
        vi.transmit_push();
        assert_eq!(vi.io().read32(TX_DESC_UPD_REG), 3);

        deliver(&vi, 0, raw(&[(EV_CODE, EV_CODE_TX), (TX_DESCR_INDX, 2)]));
        let events = poll_all(&mut vi);
        let mut ids = [0u32; 4];
        assert_eq!(vi.transmit_unbundle(&events[0], &mut ids), 2);
        assert_eq!(&ids[..2], &[5, 6]);
    }
}

// =============================================================================
// Packed stream
// =============================================================================

mod packed_stream {
    use super::*;
    use efvi::ops::ef10::regs::*;

    const CAP_LEN: u16 = 60000;

    fn ps_config(credits: u32) -> ViConfig {
        let mut cfg = config().with_flags(ViFlags::RX_PACKED_STREAM);
        cfg.ps_credits = credits;
        cfg
    }

    fn write_prefix(buf: &mut [u8], at: usize, cap: u16) {
        buf[at..at + 4].copy_from_slice(&0u32.to_le_bytes());
        buf[at + 4..at + 6].copy_from_slice(&cap.to_le_bytes());
        buf[at + 6..at + 8].copy_from_slice(&cap.to_le_bytes());
    }

    #[test]
    fn test_rotate_event_completes_buffer() {
        let mut vi = open(Generation::Ef10, ps_config(4));
        vi.receive(0x100_0000, 1).unwrap();
        vi.receive(0x200_0000, 2).unwrap();

        deliver(
            &vi,
            0,
            raw(&[(EV_CODE, EV_CODE_RX), (RX_DSC_PTR_LBITS, 2), (RX_EV_ROTATE, 1)]),
        );
        assert_eq!(
            poll_all(&mut vi),
            vec![Event::RxPackedStream { q_id: 0, n_pkts: 2, flags: RxFlags::PS_NEXT_BUFFER }]
        );
        assert_eq!(vi.receive_fill_level(), 1);
    }

    #[test]
    fn test_credit_doorbell_and_exhaustion() {
        let mut vi = open(Generation::Ef10, ps_config(2));
        vi.receive(0x100_0000, 1).unwrap();

        let mut buf = vec![0u8; 3 * PS_SPACE_PER_CREDIT];
        let mut off = PS_DMA_START_OFFSET;

        // Two packets cross the first 64 KiB boundary.
        for _ in 0..2 {
            write_prefix(&mut buf, off, CAP_LEN);
            let (pkt, next) = vi.packed_stream_unpack(&mut buf, off).unwrap();
            assert_eq!(pkt.cap_len, CAP_LEN);
            off = next;
        }
        assert_eq!(vi.packed_stream_update_credit(), Ok(1));
        assert_eq!(vi.packed_stream_credits(), 1);

        let mut expect = [0u32; 1];
        RX_DESC_MAGIC_DOORBELL.set(&mut expect, 1, Strictness::Strict);
        RX_DESC_MAGIC_CMD.set(&mut expect, RX_DESC_MAGIC_CMD_PS_CREDITS, Strictness::Strict);
        RX_DESC_MAGIC_DATA.set(&mut expect, 1, Strictness::Strict);
        assert_eq!(vi.io().read32(RX_DESC_UPD_REG), expect[0]);

        // A third packet crosses the second boundary and spends the last credit.
        write_prefix(&mut buf, off, CAP_LEN);
        vi.packed_stream_unpack(&mut buf, off).unwrap();
        assert_eq!(vi.packed_stream_update_credit(), Ok(1));
        assert_eq!(vi.packed_stream_credits(), 0);
        assert_eq!(vi.receive_init(0x300_0000, 3), Err(Error::NoCredit));

        vi.packed_stream_replenish(1).unwrap();
        assert_eq!(vi.receive_init(0x300_0000, 3), Ok(()));
    }

    #[test]
    fn test_no_boundary_no_doorbell() {
        let mut vi = open(Generation::Ef10, ps_config(2));
        vi.receive(0x100_0000, 1).unwrap();
        let before = vi.io().read32(RX_DESC_UPD_REG);

        let mut buf = vec![0u8; 4096];
        write_prefix(&mut buf, PS_DMA_START_OFFSET, 100);
        vi.packed_stream_unpack(&mut buf, PS_DMA_START_OFFSET).unwrap();
        assert_eq!(vi.packed_stream_update_credit(), Ok(0));
        assert_eq!(vi.io().read32(RX_DESC_UPD_REG), before);
        assert_eq!(vi.packed_stream_credits(), 2);
    }
}

// =============================================================================
// Driver and capabilities
// =============================================================================

mod capabilities {
    use efvi::{Capability, Driver, Error, Generation, NicFeatures, NicInfo};

    #[test]
    fn test_query_through_protection_domain() {
        let driver = Driver::new(vec![
            NicInfo::new(Generation::Falcon),
            NicInfo::new(Generation::Ef10).with_features(NicFeatures::PACKED_STREAM),
        ]);
        let dh = driver.open();
        let falcon = driver.alloc_pd(dh, 0).unwrap();
        let ef10 = driver.alloc_pd(dh, 1).unwrap();

        assert_eq!(
            driver.get_capability(dh, &falcon, dh, Capability::PackedStream),
            Err(Error::NotSupported)
        );
        assert_eq!(driver.get_capability(dh, &ef10, dh, Capability::PackedStream), Ok(1));

        driver.free_pd(dh, falcon).unwrap();
        driver.close(dh).unwrap();
        assert_eq!(
            driver.get_capability(dh, &ef10, dh, Capability::PhysMode),
            Err(Error::InvalidHandle)
        );
    }
}
