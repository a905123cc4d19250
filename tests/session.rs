use std::fs;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{Result, bail};
use pretty_assertions::assert_eq;

use mindmap_graph::mindmap::JsonFileStore;
use mindmap_graph::mutation::apply_mutation;
use mindmap_graph::{
    MindmapData, MindmapError, MindmapRemote, MindmapSession, MutationKind, NodeRecord,
    NoticeKind, Relationship, Scope, SessionConfig, ToggleOutcome,
};

struct FakeRemote {
    data: Mutex<MindmapData>,
    fail_mutations: AtomicBool,
    fetches: AtomicUsize,
    slow_room: Option<String>,
    split_delay: Duration,
}

impl FakeRemote {
    fn new(data: MindmapData) -> Self {
        Self {
            data: Mutex::new(data),
            fail_mutations: AtomicBool::new(false),
            fetches: AtomicUsize::new(0),
            slow_room: None,
            split_delay: Duration::ZERO,
        }
    }

    fn stored(&self) -> MindmapData {
        self.data.lock().expect("lock").clone()
    }
}

impl MindmapRemote for FakeRemote {
    fn fetch(&self, scope: &Scope) -> Result<MindmapData> {
        if let Scope::ChatRoom(room) = scope
            && self.slow_room.as_ref() == Some(room)
        {
            thread::sleep(Duration::from_millis(150));
        }
        self.fetches.fetch_add(1, Ordering::SeqCst);
        Ok(scope.apply(&self.data.lock().expect("lock")))
    }

    fn split_node(&self, node_id: &str) -> Result<String> {
        thread::sleep(self.split_delay);
        if self.fail_mutations.load(Ordering::SeqCst) {
            bail!("store unavailable");
        }
        apply_mutation(&mut self.data.lock().expect("lock"), MutationKind::Split, node_id);
        Ok(format!("split-{node_id}"))
    }

    fn delete_node(&self, node_id: &str) -> Result<()> {
        if self.fail_mutations.load(Ordering::SeqCst) {
            bail!("store unavailable");
        }
        apply_mutation(&mut self.data.lock().expect("lock"), MutationKind::Delete, node_id);
        Ok(())
    }
}

// r -> a -> b, a -> c, r -> d in room1; z alone in room2
fn sample() -> MindmapData {
    MindmapData::new(
        vec![
            NodeRecord::new("r", "Root").in_room("room1"),
            NodeRecord::new("a", "Alpha").in_room("room1"),
            NodeRecord::new("b", "Beta").in_room("room1"),
            NodeRecord::new("c", "Gamma").in_room("room1"),
            NodeRecord::new("d", "Delta").in_room("room1"),
            NodeRecord::new("z", "Zeta").in_room("room2"),
        ],
        vec![
            Relationship::new("r", "a", "HAS_SUBTOPIC"),
            Relationship::new("a", "b", "HAS_SUBTOPIC"),
            Relationship::new("a", "c", "RELATED_TO"),
            Relationship::new("r", "d", "HAS_SUBTOPIC"),
        ],
    )
}

fn wait_until_idle(session: &mut MindmapSession) {
    let deadline = Instant::now() + Duration::from_secs(5);
    loop {
        session.poll();
        if session.is_idle() {
            return;
        }
        assert!(Instant::now() < deadline, "session did not settle");
        thread::sleep(Duration::from_millis(5));
    }
}

fn open(remote: &Arc<FakeRemote>, scope: Scope, center: Option<&str>) -> MindmapSession {
    let mut session = MindmapSession::new(remote.clone(), SessionConfig::default());
    session.open(scope, center.map(str::to_owned));
    wait_until_idle(&mut session);
    session
}

#[test]
fn loads_levels_and_root_path() {
    let remote = Arc::new(FakeRemote::new(sample()));
    let session = open(&remote, Scope::All, None);

    let graph = session.graph().expect("ready");
    let levels = ["r", "a", "b"]
        .iter()
        .map(|id| graph.node(id).expect("node").level)
        .collect::<Vec<_>>();
    assert_eq!(levels, vec![0, 1, 2]);
    assert!(graph.node("r").expect("r").is_root);
    assert_eq!(
        graph.path_to_root("b"),
        Some(vec!["r".to_owned(), "a".to_owned(), "b".to_owned()])
    );
}

#[test]
fn hover_highlights_neighbors_and_root_path() {
    let remote = Arc::new(FakeRemote::new(sample()));
    let mut session = open(&remote, Scope::All, None);

    session.hover(Some("b"));
    let frame = session.frame().expect("frame");

    assert_eq!(frame.hover_node.as_deref(), Some("b"));
    assert_eq!(frame.highlight_nodes, vec!["a", "b", "r"]);
    let path_nodes = frame
        .nodes
        .iter()
        .filter(|node| node.is_path_node)
        .map(|node| node.id.as_str())
        .collect::<Vec<_>>();
    assert_eq!(path_nodes, vec!["r", "a", "b"]);
    assert!(!frame.nodes[3].highlighted);

    session.hover(None);
    let frame = session.frame().expect("frame");
    assert!(frame.highlight_nodes.is_empty());
    assert!(frame.nodes.iter().all(|node| !node.is_path_node));
}

#[test]
fn centered_view_hides_unrelated_branches_until_clicked() {
    let remote = Arc::new(FakeRemote::new(sample()));
    let mut session = open(&remote, Scope::ChatRoom("room1".to_owned()), Some("a"));

    let frame = session.frame().expect("frame");
    assert_eq!(frame.hidden_nodes, vec!["d"]);
    assert!(frame.nodes.iter().any(|node| node.id == "a" && node.is_center_node));

    assert_eq!(session.click("r"), ToggleOutcome::Expanded);
    assert!(session.frame().expect("frame").hidden_nodes.is_empty());

    assert_eq!(session.click("a"), ToggleOutcome::Collapsed);
    let visibility = session.visibility().expect("centered");
    assert!(visibility.is_hidden("b") && visibility.is_hidden("c"));
}

#[test]
fn stale_fetch_is_ignored_after_navigation() {
    let remote = Arc::new(FakeRemote {
        slow_room: Some("room1".to_owned()),
        ..FakeRemote::new(sample())
    });
    let mut session = MindmapSession::new(remote.clone(), SessionConfig::default());

    session.open(Scope::ChatRoom("room1".to_owned()), None);
    session.open(Scope::All, None);
    assert!(session.is_loading());
    wait_until_idle(&mut session);

    assert!(!session.is_loading());
    assert_eq!(remote.fetches.load(Ordering::SeqCst), 2);
    assert_eq!(session.scope(), &Scope::All);
    assert!(session.data().expect("ready").contains("z"));
}

#[test]
fn delete_is_optimistic_then_reconciled() {
    let remote = Arc::new(FakeRemote::new(sample()));
    let mut session = open(&remote, Scope::All, None);
    let fetches_before = remote.fetches.load(Ordering::SeqCst);

    session.request_delete("c").expect("accepted");
    assert!(!session.graph().expect("ready").contains("c"));
    assert!(session.is_mutation_pending("c"));

    wait_until_idle(&mut session);

    assert!(!remote.stored().contains("c"));
    assert!(!session.data().expect("ready").contains("c"));
    assert!(remote.fetches.load(Ordering::SeqCst) > fetches_before);
    assert!(session.take_notices().is_empty());
}

#[test]
fn failed_delete_rolls_back_and_notifies() {
    let remote = Arc::new(FakeRemote::new(sample()));
    remote.fail_mutations.store(true, Ordering::SeqCst);
    let mut session = open(&remote, Scope::All, None);

    session.request_delete("b").expect("accepted");
    assert!(!session.graph().expect("ready").contains("b"));

    wait_until_idle(&mut session);

    assert_eq!(session.data(), Some(&sample()));
    assert!(session.graph().expect("ready").contains("b"));
    let notices = session.take_notices();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].kind, NoticeKind::MutationFailed);
    assert!(notices[0].message.contains("store unavailable"));
}

#[test]
fn earlier_failure_does_not_strand_a_later_change() {
    let remote = Arc::new(FakeRemote {
        split_delay: Duration::from_millis(200),
        ..FakeRemote::new(sample())
    });
    remote.fail_mutations.store(true, Ordering::SeqCst);
    let mut session = open(&remote, Scope::All, None);

    session.request_delete("c").expect("delete accepted");
    session.request_split("a").expect("split accepted");

    let deadline = Instant::now() + Duration::from_secs(5);
    while session.is_mutation_pending("c") {
        assert!(Instant::now() < deadline, "delete did not settle");
        session.poll();
        thread::sleep(Duration::from_millis(5));
    }
    assert!(session.is_mutation_pending("a"));
    let data = session.data().expect("ready");
    assert!(data.contains("c"));
    assert!(!data.relationships.iter().any(|relationship| relationship.target == "a"));

    wait_until_idle(&mut session);

    assert_eq!(session.data(), Some(&remote.stored()));
    assert_eq!(remote.stored(), sample());
    let notices = session.take_notices();
    assert_eq!(notices.len(), 2);
    assert!(notices.iter().all(|notice| notice.kind == NoticeKind::MutationFailed));
}

#[test]
fn second_mutation_on_same_node_is_rejected() {
    let remote = Arc::new(FakeRemote::new(sample()));
    let mut session = open(&remote, Scope::All, None);

    session.request_split("a").expect("accepted");
    let second = session.request_delete("a");

    assert!(matches!(second, Err(MindmapError::ConcurrentMutation { .. })));
    let notices = session.take_notices();
    assert_eq!(notices[0].kind, NoticeKind::MutationRejected);

    wait_until_idle(&mut session);
    assert!(remote.stored().contains("a"));
    assert!(session.graph().expect("ready").node("a").expect("a").is_root);
}

#[test]
fn synthetic_room_roots_cannot_be_mutated() {
    let data = MindmapData::new(
        vec![
            NodeRecord::new("x", "x").in_room("room1"),
            NodeRecord::new("y", "y").in_room("room1"),
        ],
        Vec::new(),
    );
    let remote = Arc::new(FakeRemote::new(data));
    let mut config = SessionConfig::default();
    config.graph.chat_room_grouping = true;
    let mut session = MindmapSession::new(remote.clone(), config);
    session.open(Scope::All, None);
    wait_until_idle(&mut session);

    let graph = session.graph().expect("ready");
    let synthetic = graph.node("root_room1").expect("grouped");
    assert!(synthetic.is_synthetic && synthetic.is_root);
    assert_eq!(graph.links.len(), 2);

    let result = session.request_delete("root_room1");
    assert!(matches!(result, Err(MindmapError::SyntheticNode(_))));
    assert_eq!(session.take_notices()[0].kind, NoticeKind::MutationRejected);
}

#[test]
fn json_file_store_backs_a_session() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("mindmap.json");
    fs::write(&path, serde_json::to_string(&sample()).expect("encode")).expect("write");

    let store = Arc::new(JsonFileStore::new(&path));
    let mut session = MindmapSession::new(store, SessionConfig::default());
    session.open(Scope::Subtree("b".to_owned()), None);
    wait_until_idle(&mut session);
    assert_eq!(session.data().expect("ready").node_count(), 5);

    session.request_split("a").expect("accepted");
    wait_until_idle(&mut session);

    let graph = session.graph().expect("ready");
    assert!(!graph.contains("r"));
    assert!(graph.node("a").expect("a").is_root);
    let saved: MindmapData =
        serde_json::from_str(&fs::read_to_string(&path).expect("read")).expect("decode");
    assert_eq!(
        saved.node("b").and_then(|node| node.chat_room_id.as_deref()),
        Some("split-a")
    );
}
