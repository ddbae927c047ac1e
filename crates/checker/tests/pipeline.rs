//! End-to-end checks through the public API: engine, queue, backend replies and the
//! marker store.

use std::cell::RefCell;
use std::rc::Rc;
use std::thread::JoinHandle;

use lectern_checker::{
	Caret, CheckBackend, CheckEngine, CheckMode, CheckReply, CheckResult, CheckTypes, CheckerConfig, DocumentHost,
	GrammarCheck, Request, RequestQueue, RequestScope, RequestState,
};
use lectern_markers::MarkerStore;
use lectern_primitives::{CharIdx, CharLen, MarkerTypes, NodeId, OffsetRange, Rope};

fn init_tracing() {
	let _ = tracing_subscriber::fmt()
		.with_max_level(tracing::Level::TRACE)
		.with_test_writer()
		.try_init();
}

/// One node per paragraph, each its own editable root.
struct Document {
	nodes: Vec<(NodeId, Rope)>,
	caret: Option<Caret>,
}

impl Document {
	fn new(texts: &[&str]) -> Self {
		Self {
			nodes: texts
				.iter()
				.enumerate()
				.map(|(i, text)| (NodeId(i as u64 + 1), Rope::from_str(text)))
				.collect(),
			caret: None,
		}
	}
}

impl DocumentHost for Document {
	fn text(&self, node: NodeId) -> Option<Rope> {
		self.nodes.iter().find(|(id, _)| *id == node).map(|(_, text)| text.clone())
	}

	fn editable_root(&self, node: NodeId) -> NodeId {
		node
	}

	fn selection(&self) -> Option<Caret> {
		self.caret
	}

	fn set_caret(&mut self, caret: Caret) {
		self.caret = Some(caret);
	}

	fn replace_text(&mut self, node: NodeId, range: OffsetRange, replacement: &str) {
		if let Some((_, text)) = self.nodes.iter_mut().find(|(id, _)| *id == node) {
			text.remove(range.start..range.end);
			text.insert(range.start, replacement);
		}
	}
}

fn find_misspellings(text: &str, words: &[&str]) -> Vec<CheckResult> {
	let mut results = Vec::new();
	for word in words {
		for (byte, _) in text.match_indices(word) {
			let at = text[..byte].chars().count();
			results.push(CheckResult::spelling(at, word.chars().count()).with_replacement(word.to_uppercase()));
		}
	}
	results
}

/// Answers each request from a worker thread.
struct ThreadedBackend {
	words: &'static [&'static str],
	workers: Rc<RefCell<Vec<JoinHandle<()>>>>,
}

impl CheckBackend for ThreadedBackend {
	fn check_spelling(&mut self, _text: &str) -> Option<(CharIdx, CharLen)> {
		None
	}

	fn check_grammar(&mut self, _text: &str) -> GrammarCheck {
		GrammarCheck::default()
	}

	fn auto_correct_suggestion(&mut self, _word: &str) -> Option<String> {
		None
	}

	fn request_async_check(&mut self, request: &Request, reply: CheckReply) {
		let text = request.text().to_owned();
		let words = self.words;
		let handle = std::thread::spawn(move || {
			reply.succeed(find_misspellings(&text, words));
		});
		self.workers.borrow_mut().push(handle);
	}
}

/// Parks every reply for the test to fire.
#[derive(Default)]
struct Parked {
	requests: Vec<Request>,
	replies: Vec<CheckReply>,
}

struct ParkingBackend(Rc<RefCell<Parked>>);

impl CheckBackend for ParkingBackend {
	fn check_spelling(&mut self, _text: &str) -> Option<(CharIdx, CharLen)> {
		None
	}

	fn check_grammar(&mut self, _text: &str) -> GrammarCheck {
		GrammarCheck::default()
	}

	fn auto_correct_suggestion(&mut self, _word: &str) -> Option<String> {
		None
	}

	fn request_async_check(&mut self, request: &Request, reply: CheckReply) {
		let mut parked = self.0.borrow_mut();
		parked.requests.push(request.clone());
		parked.replies.push(reply);
	}
}

fn scoped_request(root: u64, chain: u32) -> Request {
	Request::new(
		RequestScope {
			root: NodeId(root),
			node: NodeId(root),
			text_start: 0,
		},
		"some text".into(),
		OffsetRange::new(0, 9),
		CheckTypes::SPELLING,
		CheckMode::Batch,
	)
	.with_chain(chain)
}

#[test]
fn threaded_replies_mark_every_paragraph() {
	init_tracing();
	let workers = Rc::new(RefCell::new(Vec::new()));
	let backend = ThreadedBackend {
		words: &["teh", "wrod"],
		workers: Rc::clone(&workers),
	};
	let mut engine = CheckEngine::new(CheckerConfig::default(), Box::new(backend));
	let mut store = MarkerStore::new();
	let repainted = Rc::new(RefCell::new(Vec::new()));
	let sink = Rc::clone(&repainted);
	store.set_repaint_hook(move |node| sink.borrow_mut().push(node));
	let mut doc = Document::new(&["teh first", "a second wrod", "clean third"]);

	for node in 1..=3 {
		assert_eq!(engine.check_paragraph(&mut store, &mut doc, NodeId(node), 0), 1);
	}
	assert_eq!(engine.queue().pending_len(), 2);

	let mut applied = 0;
	while engine.is_busy() {
		for worker in workers.borrow_mut().drain(..) {
			worker.join().expect("worker thread");
		}
		applied += engine.tick(&mut store, &mut doc);
	}

	assert_eq!(applied, 3);
	let spelling = store.markers(MarkerTypes::SPELLING);
	let found: Vec<_> = spelling
		.iter()
		.map(|(node, m)| (node.0, m.start(), m.end(), m.description().to_owned()))
		.collect();
	assert_eq!(found, vec![(1, 0, 3, "TEH".to_owned()), (2, 9, 13, "WROD".to_owned())]);
	assert_eq!(*repainted.borrow(), vec![NodeId(1), NodeId(2)]);
	assert_eq!(store.validate(), Ok(()));
}

#[test]
fn continuation_and_other_root_are_sequenced() {
	init_tracing();
	let parked = Rc::new(RefCell::new(Parked::default()));
	let mut backend = ParkingBackend(Rc::clone(&parked));
	let mut queue = RequestQueue::new();

	let r1 = queue.request_checking_for(scoped_request(1, 0), &mut backend);
	let r2 = queue.request_checking_for(scoped_request(1, 1), &mut backend);
	let r3 = queue.request_checking_for(scoped_request(2, 0), &mut backend);

	assert_eq!(queue.in_flight().map(Request::sequence), Some(r1));
	let pending: Vec<_> = queue.pending().map(Request::sequence).collect();
	assert_eq!(pending, vec![r2, r3]);

	let mut order = Vec::new();
	while !queue.is_idle() {
		let reply = parked.borrow_mut().replies.pop().expect("parked reply");
		reply.succeed(Vec::new());
		while let Some(finished) = queue.poll_completion() {
			assert_eq!(finished.request.state(), RequestState::Completed);
			order.push(finished.request.sequence());
		}
		queue.run_deferred(&mut backend);
	}
	assert_eq!(order, vec![r1, r2, r3]);
	assert_eq!(queue.last_processed_sequence(), r3);
}

#[test]
fn newer_check_of_same_root_replaces_queued_one() {
	init_tracing();
	let parked = Rc::new(RefCell::new(Parked::default()));
	let mut engine = CheckEngine::new(CheckerConfig::default(), Box::new(ParkingBackend(Rc::clone(&parked))));
	let mut store = MarkerStore::new();
	let mut doc = Document::new(&["busy node", "teh word"]);

	engine.check_paragraph(&mut store, &mut doc, NodeId(1), 0);
	engine.check_range(&mut store, &mut doc, NodeId(2), OffsetRange::new(0, 3));
	engine.check_range(&mut store, &mut doc, NodeId(2), OffsetRange::new(4, 8));

	let pending: Vec<_> = engine.queue().pending().map(Request::check_range).collect();
	assert_eq!(pending, vec![OffsetRange::new(4, 8)]);
}

#[test]
fn dropping_engine_detaches_in_flight_reply() {
	init_tracing();
	let parked = Rc::new(RefCell::new(Parked::default()));
	{
		let mut engine = CheckEngine::new(CheckerConfig::default(), Box::new(ParkingBackend(Rc::clone(&parked))));
		let mut store = MarkerStore::new();
		let mut doc = Document::new(&["teh"]);
		engine.check_paragraph(&mut store, &mut doc, NodeId(1), 0);
	}
	let reply = parked.borrow_mut().replies.pop().expect("parked reply");
	assert!(reply.is_detached());
	reply.succeed(vec![CheckResult::spelling(0, 3)]);
}

#[test]
fn config_file_drives_engine() {
	init_tracing();
	let config = CheckerConfig::from_toml("async_enabled = false\ncheck_grammar = false").expect("valid config");
	let parked = Rc::new(RefCell::new(Parked::default()));
	let mut engine = CheckEngine::new(config, Box::new(ParkingBackend(Rc::clone(&parked))));
	let mut store = MarkerStore::new();
	let mut doc = Document::new(&["nothing flagged"]);

	engine.check_paragraph(&mut store, &mut doc, NodeId(1), 0);

	assert!(parked.borrow().requests.is_empty());
	assert!(!engine.is_busy());
	assert!(store.is_empty());
}
