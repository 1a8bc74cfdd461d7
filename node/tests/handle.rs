//! Concurrent submitters are serialized by the handle.

use acdm_core::{Address, Amount};
use acdm_node::*;
use std::time::Duration;

const T: u64 = 1_650_000_000;
const TOKEN: Amount = 1_000_000;
const PRICE: Amount = 10_000_000_000_000;

async fn opened_sale(buyers: &[String]) -> MarketplaceHandle {
    let mut m = Marketplace::new(MarketplaceConfig::default()).unwrap();
    for buyer in buyers {
        m.apply(Call::new(
            "faucet",
            T,
            Operation::Mint {
                asset: Asset::Payment,
                to: Address::from(buyer.as_str()),
                amount: 1_000 * PRICE,
            },
        ))
        .unwrap();
    }
    m.apply(Call::new("owner", T, Operation::StartSaleRound)).unwrap();
    MarketplaceHandle::new(m)
}

#[tokio::test]
async fn test_concurrent_buys_are_serialized() {
    let buyers: Vec<String> = (0..8).map(|i| format!("buyer{}", i)).collect();
    let handle = opened_sale(&buyers).await;

    let mut tasks = Vec::new();
    for buyer in buyers.clone() {
        let handle = handle.clone();
        tasks.push(tokio::spawn(async move {
            handle
                .submit(Call::new(buyer.as_str(), T + 10, Operation::Buy { payment: 10 * PRICE }))
                .await
        }));
    }
    for task in tasks {
        let receipt = task.await.unwrap().unwrap();
        assert_eq!(receipt, Receipt::Bought { amount: 10 * TOKEN });
    }

    let round = handle.round().await;
    assert_eq!(round.tokens_remaining, round.token_minted - 80 * TOKEN);
    for buyer in &buyers {
        let view = handle.account(&Address::from(buyer.as_str()), T + 10).await;
        assert!(view.balances.contains(&(Asset::Tradable, 10 * TOKEN)));
    }

    let marketplace = handle.snapshot().await;
    assert_eq!(marketplace.applied(), 8 + 1 + 8);
}

#[tokio::test(start_paused = true)]
async fn test_readers_never_see_rejected_writes() {
    let handle = opened_sale(&["alice".to_string()]).await;

    let writer = {
        let handle = handle.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(1)).await;
            // more than the whole sale supply
            handle
                .submit(Call::new("alice", T + 1, Operation::Buy { payment: 1_000_000 * PRICE }))
                .await
        })
    };

    tokio::time::sleep(Duration::from_secs(2)).await;
    assert!(writer.await.unwrap().is_err());

    let round = handle.round().await;
    assert_eq!(round.tokens_remaining, round.token_minted);
    assert!(handle.orders().await.is_empty());
    assert!(handle.proposals().await.is_empty());
    assert!(matches!(handle.proposal(1).await, Err(MarketplaceError::Governance(_))));
    assert_eq!(handle.history().await.len(), 1);

    let marketplace = handle.into_inner().unwrap();
    assert_eq!(marketplace.last_timestamp(), Some(T));
}
