//! The crossing loop.
//!
//! Matching runs with the incoming order *outside* the book: the remainder
//! of an aggressive limit order is only installed after the loop finishes,
//! so an order can never trade against itself. Fills walk the opposing side
//! best price first and FIFO within each level, emitting two execution
//! reports per fill (aggressor first, then the resting order).

use types::{now_micros, ExecutionReport, Order, OrderId, OrderKind, Side};

use crate::book::OrderBook;

/// Cross `incoming` against the opposing side of `book`.
///
/// Mutates the book in place: resting orders are filled and spliced out
/// when complete, emptied levels are structurally removed from the index,
/// and the last-trade cache tracks every fill. The caller re-derives the
/// best-price caches afterwards.
pub(crate) fn match_incoming(
    book: &mut OrderBook,
    incoming: &mut Order,
    reports: &mut Vec<ExecutionReport>,
) {
    let is_buy = incoming.side == Side::Buy;

    while incoming.remaining() > 0 {
        let best_price = if is_buy {
            book.asks.best_price()
        } else {
            book.bids.best_price()
        };
        let Some(best_price) = best_price else {
            break; // Nothing on the opposing side.
        };

        if incoming.kind == OrderKind::Limit {
            let crosses = if is_buy {
                best_price <= incoming.price
            } else {
                best_price >= incoming.price
            };
            if !crosses {
                break;
            }
        }

        // Fully-filled resting orders leave the level and the location map.
        let mut consumed: Vec<OrderId> = Vec::new();
        let level_emptied;

        let index = if is_buy {
            &mut book.asks
        } else {
            &mut book.bids
        };
        {
            let Some(level) = index.find_mut(best_price) else {
                break;
            };

            while incoming.remaining() > 0 {
                let Some(resting) = level.front_mut() else {
                    break;
                };

                let fill = incoming.remaining().min(resting.remaining());
                let timestamp = now_micros();

                incoming.apply_fill(fill);
                resting.apply_fill(fill);

                let resting_id = resting.id;
                let resting_status = resting.status;
                let resting_filled = resting.is_filled();

                level.reduce_total(fill);

                book.last_trade_price = best_price;
                book.last_trade_qty = fill;

                reports.push(ExecutionReport {
                    order_id: incoming.id,
                    match_id: resting_id,
                    price: best_price,
                    quantity: fill,
                    status: incoming.status,
                    timestamp,
                });
                reports.push(ExecutionReport {
                    order_id: resting_id,
                    match_id: incoming.id,
                    price: best_price,
                    quantity: fill,
                    status: resting_status,
                    timestamp,
                });

                if resting_filled {
                    if let Some(done) = level.pop_front() {
                        consumed.push(done.id);
                    }
                } else {
                    // Incoming side exhausted; the head stays, partially
                    // filled in place.
                    break;
                }
            }

            level_emptied = level.is_empty();
        }

        if level_emptied {
            index.remove(best_price);
        }
        for id in consumed {
            book.locations.remove(&id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use types::OrderStatus;

    fn limit(book: &mut OrderBook, side: Side, price: f64, qty: u32) -> OrderId {
        let id = book.allocate_order_id();
        let order = Order::new(
            id,
            book.symbol().to_string(),
            side,
            OrderKind::Limit,
            price,
            qty,
            0,
        );
        book.install(order);
        id
    }

    fn aggress(
        book: &mut OrderBook,
        side: Side,
        kind: OrderKind,
        price: f64,
        qty: u32,
    ) -> (Order, Vec<ExecutionReport>) {
        // Matching operates on a detached order; the router normally
        // allocates the id from the book.
        let mut order = Order::new(
            OrderId(9_999),
            book.symbol().to_string(),
            side,
            kind,
            price,
            qty,
            0,
        );
        let mut reports = Vec::new();
        match_incoming(book, &mut order, &mut reports);
        book.refresh_best(Side::Buy);
        book.refresh_best(Side::Sell);
        (order, reports)
    }

    #[test]
    fn test_full_cross_at_one_level() {
        let mut book = OrderBook::new("TEST");
        let sell = limit(&mut book, Side::Sell, 100.0, 100);

        let (order, reports) = aggress(&mut book, Side::Buy, OrderKind::Limit, 100.0, 100);

        assert_eq!(reports.len(), 2);
        assert_eq!(reports[0].order_id, order.id);
        assert_eq!(reports[0].match_id, sell);
        assert_eq!(reports[0].status, OrderStatus::Filled);
        assert_eq!(reports[1].order_id, sell);
        assert_eq!(reports[1].status, OrderStatus::Filled);
        assert!(order.is_filled());

        assert_eq!(book.best_ask(), 0.0);
        assert_eq!(book.order_count(), 0);
        assert_eq!(book.last_trade(), (100.0, 100));
    }

    #[test]
    fn test_partial_fill_leaves_head_in_place() {
        let mut book = OrderBook::new("TEST");
        let resting = limit(&mut book, Side::Sell, 100.0, 100);

        let (order, reports) = aggress(&mut book, Side::Buy, OrderKind::Limit, 100.0, 30);

        assert_eq!(reports.len(), 2);
        assert_eq!(order.status, OrderStatus::Filled);
        // The resting order is partially filled, still at the head.
        assert_eq!(reports[1].order_id, resting);
        assert_eq!(reports[1].status, OrderStatus::PartiallyFilled);
        assert_eq!(book.level_quantity(Side::Sell, 100.0), Some(70));
        assert_eq!(book.best_ask(), 100.0);
        assert_eq!(book.order_count(), 1);
    }

    #[test]
    fn test_sweep_multiple_levels_best_first() {
        let mut book = OrderBook::new("TEST");
        limit(&mut book, Side::Sell, 101.0, 30);
        limit(&mut book, Side::Sell, 100.0, 20);
        limit(&mut book, Side::Sell, 102.0, 50);

        let (order, reports) = aggress(&mut book, Side::Buy, OrderKind::Limit, 102.0, 60);

        assert!(order.is_filled());
        assert_eq!(reports.len(), 6);
        // Aggressor-side reports walk prices best-first.
        let prices: Vec<f64> = reports.iter().step_by(2).map(|r| r.price).collect();
        assert_eq!(prices, vec![100.0, 101.0, 102.0]);
        let quantities: Vec<u32> = reports.iter().step_by(2).map(|r| r.quantity).collect();
        assert_eq!(quantities, vec![20, 30, 10]);

        // Emptied levels are gone; the swept-into level survives.
        assert_eq!(book.depth(), (0, 1));
        assert_eq!(book.best_ask(), 102.0);
        assert_eq!(book.level_quantity(Side::Sell, 102.0), Some(40));
    }

    #[test]
    fn test_emptying_best_level_keeps_other_levels() {
        // Regression shape: removing the exhausted best level must not
        // disturb the rest of the side.
        let mut book = OrderBook::new("TEST");
        limit(&mut book, Side::Sell, 100.0, 10);
        limit(&mut book, Side::Sell, 101.0, 10);
        limit(&mut book, Side::Sell, 103.0, 10);

        let (_, reports) = aggress(&mut book, Side::Buy, OrderKind::Limit, 100.0, 10);
        assert_eq!(reports.len(), 2);
        assert_eq!(book.depth(), (0, 2));
        assert_eq!(book.best_ask(), 101.0);
        assert!(book.level_quantity(Side::Sell, 103.0).is_some());
    }

    #[test]
    fn test_fifo_within_level() {
        let mut book = OrderBook::new("TEST");
        let first = limit(&mut book, Side::Sell, 100.0, 50);
        let second = limit(&mut book, Side::Sell, 100.0, 40);

        let (_, reports) = aggress(&mut book, Side::Buy, OrderKind::Limit, 100.0, 70);

        // Resting-side reports: oldest order fills first and fully.
        assert_eq!(reports[1].order_id, first);
        assert_eq!(reports[1].quantity, 50);
        assert_eq!(reports[1].status, OrderStatus::Filled);
        assert_eq!(reports[3].order_id, second);
        assert_eq!(reports[3].quantity, 20);
        assert_eq!(reports[3].status, OrderStatus::PartiallyFilled);

        assert_eq!(book.level_quantity(Side::Sell, 100.0), Some(20));
    }

    #[test]
    fn test_limit_stops_at_its_price() {
        let mut book = OrderBook::new("TEST");
        limit(&mut book, Side::Sell, 100.0, 50);
        limit(&mut book, Side::Sell, 105.0, 50);

        let (order, reports) = aggress(&mut book, Side::Buy, OrderKind::Limit, 102.0, 100);

        assert_eq!(reports.len(), 2);
        assert_eq!(order.remaining(), 50);
        assert_eq!(book.best_ask(), 105.0);
    }

    #[test]
    fn test_no_cross_no_reports() {
        let mut book = OrderBook::new("TEST");
        limit(&mut book, Side::Sell, 102.0, 100);

        let (order, reports) = aggress(&mut book, Side::Buy, OrderKind::Limit, 100.0, 100);

        assert!(reports.is_empty());
        assert_eq!(order.status, OrderStatus::New);
        assert_eq!(order.remaining(), 100);
    }

    #[test]
    fn test_market_order_sweeps_any_price() {
        let mut book = OrderBook::new("TEST");
        limit(&mut book, Side::Buy, 100.0, 30);
        limit(&mut book, Side::Buy, 95.0, 30);

        let (order, reports) = aggress(&mut book, Side::Sell, OrderKind::Market, 0.0, 40);

        assert!(order.is_filled());
        assert_eq!(reports.len(), 4);
        assert_eq!(reports[0].price, 100.0);
        assert_eq!(reports[2].price, 95.0);
        assert_eq!(reports[2].quantity, 10);
        assert_eq!(book.level_quantity(Side::Buy, 95.0), Some(20));
    }

    #[test]
    fn test_market_order_on_empty_book_fills_nothing() {
        let mut book = OrderBook::new("TEST");
        let (order, reports) = aggress(&mut book, Side::Buy, OrderKind::Market, 0.0, 10);

        assert!(reports.is_empty());
        assert_eq!(order.remaining(), 10);
        assert_eq!(book.order_count(), 0);
    }

    #[test]
    fn test_aggressor_fill_sum_matches_reports() {
        let mut book = OrderBook::new("TEST");
        limit(&mut book, Side::Sell, 100.0, 25);
        limit(&mut book, Side::Sell, 100.5, 25);
        limit(&mut book, Side::Sell, 101.0, 25);

        let (order, reports) = aggress(&mut book, Side::Buy, OrderKind::Limit, 101.0, 60);

        let aggressor_total: u32 = reports
            .iter()
            .filter(|r| r.order_id == order.id)
            .map(|r| r.quantity)
            .sum();
        assert_eq!(aggressor_total, order.filled);
        assert_eq!(order.filled, 60);
    }
}
