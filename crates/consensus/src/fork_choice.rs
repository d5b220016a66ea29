use lru::LruCache;
use std::collections::{HashMap, HashSet, VecDeque};
use std::num::NonZeroUsize;
use std::sync::{Mutex, RwLock};
use std::time::{Duration, Instant};
use vcore_types::{Hash, PublicKey, Slot};

const RECENT_VOTES_CAPACITY: usize = 10_000;
const WEIGHT_CACHE_TTL: Duration = Duration::from_millis(500);
const FORK_WEIGHTS_REFRESH_INTERVAL: Duration = Duration::from_millis(100);
const VOTE_RETENTION: Duration = Duration::from_secs(3600);
const BLOCK_RETENTION: Duration = Duration::from_secs(7200);
const FORK_STALENESS_SLOTS: Slot = 1000;

pub type ForkId = u64;

#[derive(Clone, Debug)]
pub struct BlockMetadata {
    pub hash: Hash,
    pub parent_hash: Hash,
    pub slot: Slot,
    pub stake_weight: u128,
    pub confirmation_count: u32,
    pub is_processed: bool,
    pub is_confirmed: bool,
    pub voters: HashSet<PublicKey>,
    pub arrival_time: Instant,
}

#[derive(Clone, Debug)]
pub struct Fork {
    pub head_hash: Hash,
    pub root_hash: Hash,
    pub head_slot: Slot,
    pub root_slot: Slot,
    pub stake_weight: u128,
    pub confirmation_count: u32,
    pub is_optimistically_confirmed: bool,
    pub is_rooted: bool,
    pub blocks: Vec<Hash>,
    pub last_vote_time: Instant,
}

#[derive(Clone, Debug)]
pub struct VoteInfo {
    pub slot: Slot,
    pub block_hash: Hash,
    pub validator_identity: PublicKey,
    pub stake_weight: u64,
    pub lockout_distance: u32,
    pub timestamp: Instant,
}

pub struct ForkChoiceConfig {
    pub optimistic_confirmation_threshold_pct: u8,
    pub rooting_threshold_pct: u8,
    pub max_cache_entries: usize,
}

impl Default for ForkChoiceConfig {
    fn default() -> Self {
        ForkChoiceConfig {
            optimistic_confirmation_threshold_pct: 67,
            rooting_threshold_pct: 67,
            max_cache_entries: 10_000,
        }
    }
}

struct Data {
    blocks: HashMap<Hash, BlockMetadata>,
    block_to_fork: HashMap<Hash, ForkId>,
    forks: HashMap<ForkId, Fork>,
    next_fork_id: ForkId,
    current_head: Option<Hash>,
    current_root: Option<Hash>,
    current_root_slot: Slot,
    validator_stakes: HashMap<PublicKey, u64>,
    recent_votes: VecDeque<VoteInfo>,
    stake_dirty: bool,
}

struct ForkWeightsState {
    last_refresh: Option<Instant>,
    fork_switches: u64,
}

/// Block graph, fork index, and vote log driving stake-weighted head
/// selection. Lock order, always acquired in this sequence:
/// `vote_processing -> data -> weight_cache -> fork_weights`.
pub struct ForkChoiceEngine {
    config: ForkChoiceConfig,
    vote_processing: Mutex<()>,
    data: RwLock<Data>,
    weight_cache: Mutex<LruCache<ForkId, (i128, Instant)>>,
    fork_weights: Mutex<ForkWeightsState>,
}

impl ForkChoiceEngine {
    pub fn new(config: ForkChoiceConfig) -> Self {
        let cache_cap = NonZeroUsize::new(config.max_cache_entries.max(1)).unwrap();
        ForkChoiceEngine {
            config,
            vote_processing: Mutex::new(()),
            data: RwLock::new(Data {
                blocks: HashMap::new(),
                block_to_fork: HashMap::new(),
                forks: HashMap::new(),
                next_fork_id: 0,
                current_head: None,
                current_root: None,
                current_root_slot: 0,
                validator_stakes: HashMap::new(),
                recent_votes: VecDeque::new(),
                stake_dirty: false,
            }),
            weight_cache: Mutex::new(LruCache::new(cache_cap)),
            fork_weights: Mutex::new(ForkWeightsState {
                last_refresh: None,
                fork_switches: 0,
            }),
        }
    }

    /// Adds a block to the graph, extending an existing fork whose head
    /// equals `parent_hash`, or starting a new fork rooted there.
    pub fn add_block(&self, hash: Hash, parent_hash: Hash, slot: Slot) {
        let mut data = self.data.write().unwrap();
        data.blocks.insert(
            hash,
            BlockMetadata {
                hash,
                parent_hash,
                slot,
                stake_weight: 0,
                confirmation_count: 0,
                is_processed: true,
                is_confirmed: false,
                voters: HashSet::new(),
                arrival_time: Instant::now(),
            },
        );

        let extend_fork_id = data.block_to_fork.get(&parent_hash).copied().filter(|id| {
            data.forks
                .get(id)
                .map(|f| f.head_hash == parent_hash)
                .unwrap_or(false)
        });

        match extend_fork_id {
            Some(fork_id) => {
                let fork = data.forks.get_mut(&fork_id).unwrap();
                fork.blocks.push(hash);
                fork.head_hash = hash;
                fork.head_slot = slot;
                data.block_to_fork.insert(hash, fork_id);
            }
            None => {
                let fork_id = data.next_fork_id;
                data.next_fork_id += 1;
                let root_slot = data
                    .blocks
                    .get(&parent_hash)
                    .map(|b| b.slot)
                    .unwrap_or(slot);
                data.forks.insert(
                    fork_id,
                    Fork {
                        head_hash: hash,
                        root_hash: parent_hash,
                        head_slot: slot,
                        root_slot,
                        stake_weight: 0,
                        confirmation_count: 0,
                        is_optimistically_confirmed: false,
                        is_rooted: false,
                        blocks: vec![hash],
                        last_vote_time: Instant::now(),
                    },
                );
                data.block_to_fork.insert(hash, fork_id);
            }
        }
        data.stake_dirty = true;
        drop(data);
        self.update_fork_weights();
    }

    fn ancestors_locked(data: &Data, hash: Hash, max: usize) -> Vec<Hash> {
        let mut out = Vec::new();
        let mut current = hash;
        while out.len() < max {
            match data.blocks.get(&current) {
                Some(meta) if meta.parent_hash != current => {
                    out.push(meta.parent_hash);
                    current = meta.parent_hash;
                }
                _ => break,
            }
        }
        out
    }

    fn is_ancestor_locked(data: &Data, candidate: Hash, of: Hash) -> bool {
        let mut current = of;
        loop {
            match data.blocks.get(&current) {
                Some(meta) if meta.hash == candidate => return true,
                Some(meta) if meta.parent_hash != current => current = meta.parent_hash,
                _ => return current == candidate,
            }
        }
    }

    pub fn add_vote(&self, vote: VoteInfo) {
        vcore_metrics::CONSENSUS_METRICS.votes_processed.inc();
        let _serialize = self.vote_processing.lock().unwrap();
        let mut data = self.data.write().unwrap();

        if data.recent_votes.len() >= RECENT_VOTES_CAPACITY {
            data.recent_votes.pop_front();
        }
        data.recent_votes.push_back(vote.clone());

        data.validator_stakes
            .insert(vote.validator_identity, vote.stake_weight);

        let mut chain = vec![vote.block_hash];
        chain.extend(Self::ancestors_locked(&data, vote.block_hash, usize::MAX));
        for hash in chain {
            if let Some(meta) = data.blocks.get_mut(&hash) {
                meta.stake_weight = meta.stake_weight.saturating_add(vote.stake_weight as u128);
            }
        }

        if let Some(meta) = data.blocks.get_mut(&vote.block_hash) {
            meta.voters.insert(vote.validator_identity);
        }

        data.stake_dirty = true;
        drop(data);

        self.drain_pending_confirmations();
        self.scan_rooting_candidates();
        self.update_fork_weights();
    }

    pub fn process_votes_batch(&self, votes: Vec<VoteInfo>) {
        for v in votes {
            self.add_vote(v);
        }
    }

    fn supporting_stake(&self, data: &Data, block: Hash) -> u128 {
        data.blocks.get(&block).map(|b| b.stake_weight).unwrap_or(0)
    }

    fn total_stake(&self, data: &Data) -> u128 {
        data.validator_stakes.values().map(|&s| s as u128).sum()
    }

    fn drain_pending_confirmations(&self) {
        let mut data = self.data.write().unwrap();
        let total = self.total_stake(&data);
        if total == 0 {
            return;
        }
        let threshold = total * self.config.optimistic_confirmation_threshold_pct as u128 / 100;
        let newly_confirmed: Vec<Hash> = data
            .blocks
            .values()
            .filter(|b| !b.is_confirmed && b.stake_weight >= threshold)
            .map(|b| b.hash)
            .collect();
        for hash in newly_confirmed {
            if let Some(b) = data.blocks.get_mut(&hash) {
                b.is_confirmed = true;
            }
            if let Some(fork_id) = data.block_to_fork.get(&hash).copied() {
                if let Some(fork) = data.forks.get_mut(&fork_id) {
                    fork.is_optimistically_confirmed = true;
                }
            }
        }
    }

    fn scan_rooting_candidates(&self) {
        let mut data = self.data.write().unwrap();
        let total = self.total_stake(&data);
        if total == 0 {
            return;
        }
        let threshold = total * self.config.rooting_threshold_pct as u128 / 100;
        let rootable: Vec<(Hash, Slot)> = data
            .blocks
            .values()
            .filter(|b| b.stake_weight >= threshold)
            .map(|b| (b.hash, b.slot))
            .collect();

        if let Some(&(hash, slot)) = rootable.iter().max_by_key(|(_, slot)| *slot) {
            if data.current_root_slot < slot {
                data.current_root = Some(hash);
                data.current_root_slot = slot;
                if let Some(fork_id) = data.block_to_fork.get(&hash).copied() {
                    if let Some(fork) = data.forks.get_mut(&fork_id) {
                        fork.is_rooted = true;
                        fork.root_hash = hash;
                        fork.root_slot = slot;
                    }
                }
                vcore_metrics::CONSENSUS_METRICS.slots_rooted.inc();
            }
        }
    }

    fn fork_weight(&self, data: &Data, fork_id: ForkId, fork: &Fork) -> i128 {
        if let Some(cached) = self.weight_cache.lock().unwrap().get(&fork_id) {
            if cached.1.elapsed() < WEIGHT_CACHE_TTL {
                vcore_metrics::CONSENSUS_METRICS.weight_cache_hits.inc();
                return cached.0;
            }
        }
        vcore_metrics::CONSENSUS_METRICS.weight_cache_misses.inc();
        let head_stake = self.supporting_stake(data, fork.head_hash);
        let mut w: i128 = fork.head_slot as i128 * 1000;
        w += head_stake as i128;
        if fork.is_optimistically_confirmed {
            w += 50_000;
        }
        if fork.is_rooted {
            w += 100_000;
        }
        w += fork.confirmation_count as i128 * 1000;
        w
    }

    /// Background refresh of the weight cache and head, rate-limited to
    /// once per 100 ms. This is an optimization only — it keeps the weight
    /// cache warm between mutations — and is never the sole path by which a
    /// vote or block becomes visible in `get_head()`. Correctness of
    /// `get_head()` is instead guaranteed by `ensure_fresh`, which forces an
    /// unthrottled recompute whenever the graph is dirty.
    pub fn update_fork_weights(&self) {
        {
            let mut fw = self.fork_weights.lock().unwrap();
            if let Some(last) = fw.last_refresh {
                if last.elapsed() < FORK_WEIGHTS_REFRESH_INTERVAL {
                    return;
                }
            }
            fw.last_refresh = Some(Instant::now());
        }
        self.recompute_head();
    }

    /// Unconditionally recomputes fork weights and the current head. No
    /// rate limiting: callers that need a correct answer (as opposed to an
    /// opportunistic background refresh) must call this directly.
    fn recompute_head(&self) {
        let started = Instant::now();
        let mut data = self.data.write().unwrap();
        let mut best: Option<(ForkId, Hash, i128, Slot)> = None;
        let fork_ids: Vec<ForkId> = data.forks.keys().copied().collect();
        vcore_metrics::CONSENSUS_METRICS.active_forks.set(fork_ids.len() as i64);
        for fork_id in fork_ids {
            let fork = data.forks.get(&fork_id).unwrap().clone();
            let weight = self.fork_weight(&data, fork_id, &fork);
            self.weight_cache
                .lock()
                .unwrap()
                .put(fork_id, (weight, Instant::now()));
            let better = match &best {
                None => true,
                Some((_, best_hash, best_weight, best_slot)) => {
                    weight > *best_weight
                        || (weight == *best_weight
                            && (fork.head_slot > *best_slot
                                || (fork.head_slot == *best_slot && fork.head_hash > *best_hash)))
                }
            };
            if better {
                best = Some((fork_id, fork.head_hash, weight, fork.head_slot));
            }
        }

        if let Some((_, head_hash, _, _)) = best {
            if data.current_head != Some(head_hash) {
                self.fork_weights.lock().unwrap().fork_switches += 1;
                vcore_metrics::CONSENSUS_METRICS.head_changes.inc();
            }
            data.current_head = Some(head_hash);
        }
        data.stake_dirty = false;
        drop(data);
        vcore_metrics::CONSENSUS_METRICS
            .fork_choice_latency_ms
            .observe(started.elapsed().as_secs_f64() * 1000.0);
    }

    /// Forces a recompute if the graph has changed since the last one,
    /// bypassing `update_fork_weights`'s rate limiter. Called before every
    /// head read so a vote or block is always visible to the next
    /// `get_head()` caller regardless of the background refresh timer.
    fn ensure_fresh(&self) {
        if self.data.read().unwrap().stake_dirty {
            self.recompute_head();
        }
    }

    pub fn get_head(&self) -> Option<Hash> {
        self.ensure_fresh();
        self.data.read().unwrap().current_head
    }

    pub fn get_root(&self) -> Option<Hash> {
        self.data.read().unwrap().current_root
    }

    pub fn get_active_forks(&self) -> Vec<Fork> {
        self.data.read().unwrap().forks.values().cloned().collect()
    }

    pub fn get_ancestors(&self, hash: Hash, max: usize) -> Vec<Hash> {
        let data = self.data.read().unwrap();
        Self::ancestors_locked(&data, hash, max)
    }

    pub fn get_descendants(&self, hash: Hash) -> Vec<Hash> {
        let data = self.data.read().unwrap();
        data.blocks
            .values()
            .filter(|b| Self::is_ancestor_locked(&data, hash, b.hash) && b.hash != hash)
            .map(|b| b.hash)
            .collect()
    }

    pub fn is_ancestor(&self, candidate: Hash, of: Hash) -> bool {
        let data = self.data.read().unwrap();
        Self::is_ancestor_locked(&data, candidate, of)
    }

    pub fn is_optimistically_confirmed(&self, hash: Hash) -> bool {
        self.data
            .read()
            .unwrap()
            .blocks
            .get(&hash)
            .map(|b| b.is_confirmed)
            .unwrap_or(false)
    }

    pub fn is_rooted(&self, hash: Hash) -> bool {
        let data = self.data.read().unwrap();
        match data.current_root {
            Some(root) => hash == root || Self::is_ancestor_locked(&data, hash, root),
            None => false,
        }
    }

    pub fn get_stake_weight(&self, hash: Hash) -> u128 {
        self.data
            .read()
            .unwrap()
            .blocks
            .get(&hash)
            .map(|b| b.stake_weight)
            .unwrap_or(0)
    }

    pub fn get_confirmation_count(&self, hash: Hash) -> u32 {
        self.data
            .read()
            .unwrap()
            .blocks
            .get(&hash)
            .map(|b| b.confirmation_count)
            .unwrap_or(0)
    }

    pub fn fork_switch_count(&self) -> u64 {
        self.fork_weights.lock().unwrap().fork_switches
    }

    /// Advisory, read-only consistency check; never mutates state.
    pub fn verify_consistency(&self) -> bool {
        let data = self.data.read().unwrap();
        data.block_to_fork.keys().all(|hash| data.blocks.contains_key(hash))
    }

    /// Drops stale votes, unreferenced blocks, and stale non-rooted forks.
    pub fn garbage_collect(&self) {
        let mut data = self.data.write().unwrap();
        let now = Instant::now();

        data.recent_votes
            .retain(|v| now.duration_since(v.timestamp) < VOTE_RETENTION);

        let referenced: HashSet<Hash> = data.block_to_fork.keys().copied().collect();
        data.blocks.retain(|hash, meta| {
            referenced.contains(hash) || now.duration_since(meta.arrival_time) < BLOCK_RETENTION
        });

        let head_slot = data.current_head.and_then(|h| data.blocks.get(&h)).map(|b| b.slot);
        if let Some(head_slot) = head_slot {
            let stale_forks: Vec<ForkId> = data
                .forks
                .iter()
                .filter(|(_, f)| {
                    !f.is_rooted && f.head_slot + FORK_STALENESS_SLOTS < head_slot
                })
                .map(|(id, _)| *id)
                .collect();
            for fork_id in stale_forks {
                data.forks.remove(&fork_id);
                data.block_to_fork.retain(|_, id| *id != fork_id);
            }
        }
    }

    pub fn expire_stale_cache_entries(&self) {
        let mut cache = self.weight_cache.lock().unwrap();
        let stale: Vec<ForkId> = cache
            .iter()
            .filter(|(_, (_, at))| at.elapsed() >= WEIGHT_CACHE_TTL)
            .map(|(id, _)| *id)
            .collect();
        for id in stale {
            cache.pop(&id);
        }
    }
}
