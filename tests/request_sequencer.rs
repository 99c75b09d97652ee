mod common;

use common::{StubGateway, install_dashboard, instrument, page, raw_row};
use futures::executor::LocalPool;
use futures::task::LocalSpawnExt;
use krx_dashboard_wasm::application::dashboard::{load_prices, with_dashboard, with_dashboard_mut};
use krx_dashboard_wasm::domain::sequencing::RequestSequence;
use quickcheck_macros::quickcheck;
use std::rc::Rc;

#[quickcheck]
fn last_ticket_wins_under_any_arrival_order(arrival_seed: Vec<u8>, count_seed: u8) -> bool {
    let count = usize::from(count_seed % 6) + 2;
    let seq = RequestSequence::new();
    let tickets: Vec<_> = (0..count).map(|_| seq.begin()).collect();

    // Permute arrivals: stable order derived from the seed.
    let mut arrivals: Vec<usize> = (0..count).collect();
    arrivals.sort_by_key(|&i| arrival_seed.get(i).copied().unwrap_or(i as u8));

    let mut applied: Option<usize> = None;
    let mut busy = true;
    for index in arrivals {
        if seq.is_current(tickets[index]) {
            applied = Some(index);
            busy = false;
        }
    }
    applied == Some(count - 1) && !busy
}

#[quickcheck]
fn busy_is_cleared_only_by_the_highest_ticket(arrived_mask: u8) -> bool {
    let count = 5;
    let seq = RequestSequence::new();
    let tickets: Vec<_> = (0..count).map(|_| seq.begin()).collect();

    let mut busy = true;
    for (index, ticket) in tickets.iter().enumerate() {
        let arrived = arrived_mask & (1 << index) != 0;
        if arrived && seq.is_current(*ticket) {
            busy = false;
        }
    }
    let highest_arrived = arrived_mask & (1 << (count - 1)) != 0;
    busy != highest_arrived
}

#[test]
fn newer_response_applies_and_stale_one_is_discarded() {
    install_dashboard();
    with_dashboard_mut(|d| d.selected_instrument = Some(instrument("005930", "KOSPI")));

    let gateway = StubGateway::new();
    gateway.manual_prices.set(true);

    let mut pool = LocalPool::new();
    let spawner = pool.spawner();

    let first = Rc::clone(&gateway);
    spawner.spawn_local(async move { load_prices(&*first).await }).unwrap();
    pool.run_until_stalled();
    let second = Rc::clone(&gateway);
    spawner.spawn_local(async move { load_prices(&*second).await }).unwrap();
    pool.run_until_stalled();

    assert_eq!(gateway.pending_prices.borrow().len(), 2);
    assert!(with_dashboard(|d| d.price_loading).unwrap());

    // The second (newest) request resolves first and is applied.
    gateway.resolve_newest_price(page(vec![raw_row("2024-01-03", 11.0, 13.0, 10.0, 12.0, 50.0)]));
    pool.run_until_stalled();
    with_dashboard(|d| {
        assert!(!d.price_loading);
        assert_eq!(d.prices.len(), 1);
        assert_eq!(d.prices[0].trade_date, "2024-01-03");
    });

    // The first request resolves last: discarded entirely.
    gateway.resolve_oldest_price(page(vec![raw_row("2024-01-02", 1.0, 2.0, 1.0, 2.0, 10.0)]));
    pool.run_until_stalled();
    with_dashboard(|d| {
        assert!(!d.price_loading);
        assert_eq!(d.prices.len(), 1);
        assert_eq!(d.prices[0].trade_date, "2024-01-03");
    });
}

#[test]
fn stale_response_does_not_clear_busy_while_newer_is_in_flight() {
    install_dashboard();
    with_dashboard_mut(|d| d.selected_instrument = Some(instrument("005930", "KOSPI")));

    let gateway = StubGateway::new();
    gateway.manual_prices.set(true);

    let mut pool = LocalPool::new();
    let spawner = pool.spawner();
    for _ in 0..2 {
        let client = Rc::clone(&gateway);
        spawner.spawn_local(async move { load_prices(&*client).await }).unwrap();
        pool.run_until_stalled();
    }

    // The older response lands while the newer request is still pending:
    // state and the loading flag must stay untouched.
    gateway.resolve_oldest_price(page(vec![raw_row("2024-01-02", 1.0, 2.0, 1.0, 2.0, 10.0)]));
    pool.run_until_stalled();
    with_dashboard(|d| {
        assert!(d.price_loading);
        assert!(d.prices.is_empty());
    });

    gateway.resolve_oldest_price(page(vec![raw_row("2024-01-03", 11.0, 13.0, 10.0, 12.0, 50.0)]));
    pool.run_until_stalled();
    with_dashboard(|d| {
        assert!(!d.price_loading);
        assert_eq!(d.prices[0].trade_date, "2024-01-03");
    });
}

#[test]
fn selection_reset_supersedes_in_flight_benchmark_loads() {
    install_dashboard();
    with_dashboard_mut(|d| {
        d.selected_instrument = Some(instrument("005930", "KOSPI"));
        d.show_instrument_bench = true;
        let ticket = d.instrument_bench_seq.begin();
        d.reset_instrument_benchmark();
        assert!(!d.instrument_bench_seq.is_current(ticket));
    });
}
