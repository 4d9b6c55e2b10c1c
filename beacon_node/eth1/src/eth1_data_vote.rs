use crate::errors::Error;
use crate::feed::Eth1DepositFeed;
use std::collections::HashMap;
use types::{BeaconState, ChainSpec, Eth1Data};

/// Implements §4.8's `Eth1Data()`: if the state carries no votes yet, fall back to the
/// accumulator's current root paired with the block at the trailing edge of the follow window.
/// Otherwise take the vote with the most occurrences, breaking ties by whichever competing block
/// hash sits at the greater height in the ETH1 chain — an absent hash loses the tie (§9).
pub async fn select_eth1_data(
    state: &BeaconState,
    feed: &dyn Eth1DepositFeed,
    current_deposit_root: types::Hash256,
    spec: &ChainSpec,
) -> Result<Eth1Data, Error> {
    if state.eth1_data_votes.is_empty() {
        let latest = feed.latest_block_number().await?;
        let target_height = latest.saturating_sub(spec.eth1_follow_distance);
        let block_hash = feed
            .block_hash_at_height(target_height)
            .await?
            .ok_or(Error::Eth1AncestorUnavailable)?;
        return Ok(Eth1Data {
            deposit_root: current_deposit_root,
            deposit_count: state.eth1_deposit_index,
            block_hash,
        });
    }

    let mut counts: HashMap<types::Hash256, (u64, Eth1Data)> = HashMap::new();
    for vote in &state.eth1_data_votes {
        let entry = counts
            .entry(vote.block_hash)
            .or_insert((0, vote.clone()));
        entry.0 += 1;
    }

    let mut heights = HashMap::new();
    for block_hash in counts.keys() {
        let height = feed.block_number_of_hash(*block_hash).await?;
        heights.insert(*block_hash, height);
    }

    let winner = counts
        .into_iter()
        .max_by(|(hash_a, (count_a, _)), (hash_b, (count_b, _))| {
            count_a
                .cmp(count_b)
                .then_with(|| heights[hash_a].cmp(&heights[hash_b]))
        })
        .map(|(_, (_, data))| data)
        .expect("state.eth1_data_votes is non-empty");

    Ok(winner)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::Error;
    use futures::future::{BoxFuture, FutureExt};
    use types::Hash256;

    struct StubFeed {
        heights: HashMap<Hash256, u64>,
    }

    impl Eth1DepositFeed for StubFeed {
        fn latest_block_number(&self) -> BoxFuture<'_, Result<u64, Error>> {
            async { Ok(100) }.boxed()
        }

        fn block_hash_at_height(&self, _height: u64) -> BoxFuture<'_, Result<Option<Hash256>, Error>> {
            async { Ok(None) }.boxed()
        }

        fn block_number_of_hash(&self, hash: Hash256) -> BoxFuture<'_, Result<Option<u64>, Error>> {
            let height = self.heights.get(&hash).copied();
            async move { Ok(height) }.boxed()
        }

        fn block_timestamp_at_height(&self, _height: u64) -> BoxFuture<'_, Result<Option<u64>, Error>> {
            async { Ok(None) }.boxed()
        }

        fn deposit_logs_since(
            &self,
            _from_index: u64,
        ) -> BoxFuture<'_, Result<Vec<(u64, types::Deposit, u64)>, Error>> {
            async { Ok(vec![]) }.boxed()
        }
    }

    fn vote(block_hash: Hash256) -> Eth1Data {
        Eth1Data {
            deposit_root: Hash256::zero(),
            deposit_count: 0,
            block_hash,
        }
    }

    #[tokio::test]
    async fn tie_is_broken_by_greater_eth1_block_number() {
        let hash_a = Hash256::repeat_byte(0xaa);
        let hash_b = Hash256::repeat_byte(0xbb);
        let feed = StubFeed {
            heights: [(hash_a, 4), (hash_b, 3)].into_iter().collect(),
        };

        let mut state = BeaconState::genesis(0, Eth1Data::default(), vec![], vec![], &ChainSpec::mainnet());
        state.eth1_data_votes = vec![
            vote(hash_a),
            vote(hash_a),
            vote(hash_a),
            vote(hash_b),
            vote(hash_b),
            vote(hash_b),
        ];

        let winner = select_eth1_data(&state, &feed, Hash256::zero(), &ChainSpec::mainnet())
            .await
            .unwrap();
        assert_eq!(winner.block_hash, hash_a);
    }

    #[tokio::test]
    async fn absent_competing_hash_loses_the_tie() {
        let hash_a = Hash256::repeat_byte(0xaa);
        let hash_b = Hash256::repeat_byte(0xbb);
        let feed = StubFeed {
            heights: [(hash_a, 4)].into_iter().collect(),
        };

        let mut state = BeaconState::genesis(0, Eth1Data::default(), vec![], vec![], &ChainSpec::mainnet());
        state.eth1_data_votes = vec![vote(hash_a), vote(hash_b)];

        let winner = select_eth1_data(&state, &feed, Hash256::zero(), &ChainSpec::mainnet())
            .await
            .unwrap();
        assert_eq!(winner.block_hash, hash_a);
    }
}
