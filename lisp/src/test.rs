// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

#[cfg(test)]
#[rustfmt::skip]
mod tests {
    use crate::entry::{EntryFwd, FwdEntryRequest, NegativeAction};
    use crate::errors::{ErrorCode, FwdEntryError};
    use crate::key::EndpointId;
    use crate::mac::Mac;
    use crate::{LispGpe, LispGpeParams, LispGpeParamsBuilder};
    use fib::FibError;
    use fib::adjacency::{IfIndex, NextHop};
    use fib::dpo::{Dpo, DpoProto, LookupInput};
    use fib::prefix::{FibProtocol, Prefix};
    use fib::table::FibSource;
    use rand::Rng;
    use std::net::IpAddr;
    use std::str::FromStr;
    use tracing_test::traced_test;

    const BD: u32 = 100;

    fn prefix(s: &str) -> Prefix {
        Prefix::from_str(s).unwrap()
    }
    fn pfx(s: &str) -> EndpointId {
        EndpointId::IpPrefix(prefix(s))
    }
    fn mac(n: u8) -> Mac {
        Mac([0x02, 0, 0, 0, 0, n])
    }
    fn nh(ifindex: u32, rmt: &str) -> NextHop {
        NextHop::new(IfIndex(ifindex), IpAddr::from_str("192.0.2.1").unwrap(), IpAddr::from_str(rmt).unwrap())
    }
    fn setup() -> LispGpe {
        let mut lisp = LispGpe::new(LispGpeParamsBuilder::default().l2fib_capacity(1024usize).build().unwrap());
        lisp.add_interface(IfIndex(0), true).unwrap();
        lisp.add_interface(IfIndex(1), true).unwrap();
        lisp.add_interface(IfIndex(2), true).unwrap();
        lisp.add_bridge_domain(BD).unwrap();
        lisp
    }
    fn l2_request(dst: Mac, src: Mac) -> FwdEntryRequest {
        FwdEntryRequest::new(EndpointId::Mac(dst), EndpointId::Mac(src), 50).with_bd_id(BD)
    }
    fn bd_index(lisp: &LispGpe) -> u16 {
        lisp.bridge_domains.find_index(BD).unwrap()
    }

    /// Registries keep no slot for released objects
    fn assert_purged(lisp: &mut LispGpe) {
        assert_eq!(lisp.fib_mut().purge(), 0);
        assert_eq!(lisp.tenants.purge(), 0);
    }

    /// Tables, adjacencies, path-lists, tenants, entries and flat table entries
    fn counts(lisp: &LispGpe) -> [usize; 6] {
        [
            lisp.fib().tables.len(),
            lisp.fib().adjacencies.len(),
            lisp.fib().pathlists.len(),
            lisp.tenants().len(),
            lisp.entries().len(),
            lisp.l2fib().len(),
        ]
    }

    #[test]
    #[traced_test]
    fn test_ipv6_entry_add_delete() {
        let mut lisp = setup();
        let before = counts(&lisp);
        let request = FwdEntryRequest::new(pfx("2001:db8::/64"), pfx("2001:db8:1::/64"), 100)
            .with_table_id(7)
            .with_locator(0, 1, nh(0, "2001:db8:ffff::1"));

        let index = lisp.add(&request).unwrap();
        let eid_fib = lisp.fib().tables.find(FibProtocol::Ip6, 7).unwrap();
        let Some(EntryFwd::Ip(fwd)) = lisp.entries().get(index).map(|e| &e.fwd) else { panic!("not an ip entry") };
        let src_fib = fwd.src_fib.clone().unwrap();

        /* destination route recurses to the source table */
        assert!(eid_fib.is_sourced(&prefix("2001:db8::/64"), FibSource::Lisp));
        assert_eq!(
            eid_fib.forwarding(&prefix("2001:db8::/64")),
            Some(Dpo::Lookup { table: src_fib.index(), proto: DpoProto::Ip6, input: LookupInput::SrcAddr })
        );

        /* source route over the single path */
        let Some(Dpo::LoadBalance(lb)) = src_fib.forwarding(&prefix("2001:db8:1::/64")) else { panic!("no source route") };
        assert_eq!(lb.buckets.len(), 1);
        let adj = lisp.entries().get(index).unwrap().paths[0].adjacency.index();
        assert_eq!(lb.buckets[0].dpo, Dpo::adjacency(adj, DpoProto::Ip6));
        drop((eid_fib, src_fib, lb));

        lisp.delete(&request).unwrap();
        assert!(lisp.entries().find(&request.key()).is_none());
        assert_eq!(counts(&lisp), before, "every lock must be released");
        assert_purged(&mut lisp);
        assert!(logs_contain("Deleted entry"));
    }

    #[test]
    fn test_entries_share_destination_route() {
        let mut lisp = setup();
        let r1 = FwdEntryRequest::new(pfx("10.1.0.0/16"), pfx("10.2.0.0/16"), 1)
            .with_locator(1, 1, nh(1, "198.51.100.1"));
        let r2 = FwdEntryRequest::new(pfx("10.1.0.0/16"), pfx("10.3.0.0/16"), 1)
            .with_locator(1, 1, nh(1, "198.51.100.2"));
        lisp.add(&r1).unwrap();
        lisp.add(&r2).unwrap();
        assert_eq!(lisp.fib().tables.len(), 2, "one vrf table and one shared source table");

        let eid_fib = lisp.fib().tables.find(FibProtocol::Ip4, 0).unwrap();
        let Some(Dpo::Lookup { table, .. }) = eid_fib.forwarding(&prefix("10.1.0.0/16")) else { panic!("no route") };
        let src_fib = lisp.fib().tables.get(table).unwrap();
        assert_eq!(src_fib.num_entries(FibSource::Lisp), 2);
        drop(src_fib);

        lisp.delete(&r1).unwrap();
        assert!(eid_fib.is_sourced(&prefix("10.1.0.0/16"), FibSource::Lisp));
        lisp.delete(&r2).unwrap();
        assert!(!eid_fib.lookup_exact_match(&prefix("10.1.0.0/16")));
        drop(eid_fib);
        assert!(lisp.fib().tables.is_empty());
    }

    #[test]
    fn test_unspecified_local_of_other_family() {
        let mut lisp = setup();
        let request = FwdEntryRequest::new(pfx("2001:db8::/32"), pfx("0.0.0.0/0"), 3)
            .with_locator(1, 1, nh(1, "198.51.100.1"));
        lisp.add(&request).unwrap();
        let same = FwdEntryRequest::new(pfx("2001:db8::/32"), pfx("::/0"), 3);
        assert!(lisp.entries().find(&same.key()).is_some());
        assert_eq!(lisp.add(&same).err(), Some(FwdEntryError::AlreadyExists(same.key())));
        lisp.delete(&same).unwrap();
        assert!(lisp.entries().is_empty());
    }

    #[test]
    fn test_negative_l3_entries() {
        let mut lisp = setup();
        let mk = |rmt: &str, action| FwdEntryRequest::new(pfx(rmt), pfx("0.0.0.0/0"), 9)
            .with_negative_action(action)
            .with_locator(1, 1, nh(1, "198.51.100.1"));

        let idx = lisp.add(&mk("10.9.0.0/16", NegativeAction::SendMapRequest)).unwrap();
        assert!(lisp.entries().get(idx).unwrap().paths.is_empty(), "negative entries have no paths");
        lisp.add(&mk("10.8.0.0/16", NegativeAction::Drop)).unwrap();
        lisp.add(&mk("10.7.0.0/16", NegativeAction::NoAction)).unwrap();
        lisp.add(&mk("10.6.0.0/16", NegativeAction::ForwardNative)).unwrap();
        assert!(lisp.fib().adjacencies.is_empty());
        assert_eq!(lisp.fib().tables.len(), 5, "one vrf table and a source table per destination");

        let eid_fib = lisp.fib().tables.find(FibProtocol::Ip4, 0).unwrap();
        let src_action = |rmt: &str| {
            let Some(Dpo::Lookup { table, .. }) = eid_fib.forwarding(&prefix(rmt)) else { return None };
            lisp.fib().tables.get(table).unwrap().forwarding(&prefix("0.0.0.0/0"))
        };
        assert_eq!(src_action("10.9.0.0/16"), Some(Dpo::control_plane(DpoProto::Ip4)));
        assert_eq!(src_action("10.8.0.0/16"), Some(Dpo::drop(DpoProto::Ip4)));
        /* native routing: a route to an empty source table */
        for rmt in ["10.7.0.0/16", "10.6.0.0/16"] {
            assert!(eid_fib.is_sourced(&prefix(rmt), FibSource::Lisp));
            assert_eq!(src_action(rmt), None);
        }
        drop(eid_fib);

        for rmt in ["10.9.0.0/16", "10.8.0.0/16", "10.7.0.0/16", "10.6.0.0/16"] {
            lisp.delete(&FwdEntryRequest::new(pfx(rmt), pfx("0.0.0.0/0"), 9)).unwrap();
        }
        assert_eq!(counts(&lisp), [0, 0, 0, 0, 0, 0]);
        assert_purged(&mut lisp);
    }

    #[test]
    fn test_add_delete_errors() {
        let mut lisp = setup();
        let request = FwdEntryRequest::new(pfx("10.1.0.0/16"), pfx("10.2.0.0/16"), 1)
            .with_locator(1, 1, nh(1, "198.51.100.1"));
        lisp.add(&request).unwrap();

        let e = lisp.add(&request).unwrap_err();
        assert_eq!(e, FwdEntryError::AlreadyExists(request.key()));
        assert_eq!(e.code(), ErrorCode::InvalidValue);

        let missing = FwdEntryRequest::new(pfx("10.1.0.0/16"), pfx("10.2.0.0/16"), 2);
        let e = lisp.delete(&missing).unwrap_err();
        assert_eq!(e, FwdEntryError::NotFound(missing.key()));
        assert_eq!(e.code(), ErrorCode::InvalidValue);

        let mixed = FwdEntryRequest::new(pfx("10.1.0.0/16"), EndpointId::Mac(mac(1)), 1);
        let e = lisp.add(&mixed).unwrap_err();
        assert_eq!(e, FwdEntryError::UnsupportedEndpointKind);
        assert_eq!(e.code(), ErrorCode::Unspecified);

        let families = FwdEntryRequest::new(pfx("10.1.0.0/16"), pfx("2001:db8::/32"), 1)
            .with_locator(1, 1, nh(1, "198.51.100.1"));
        assert_eq!(lisp.add(&families).unwrap_err().code(), ErrorCode::InvalidValue);

        let no_bd = l2_request(mac(1), mac(2)).with_bd_id(999).with_locator(1, 1, nh(1, "198.51.100.1"));
        assert_eq!(lisp.add(&no_bd).unwrap_err(), FwdEntryError::NoSuchBridgeDomain(999));
        assert_eq!(lisp.entries().len(), 1);
    }

    #[test]
    fn test_failed_add_leaves_no_trace() {
        let mut lisp = setup();
        let before = counts(&lisp);
        let request = FwdEntryRequest::new(pfx("10.1.0.0/16"), pfx("10.2.0.0/16"), 1)
            .with_locator(1, 1, nh(1, "198.51.100.1"))
            .with_locator(2, 1, nh(42, "198.51.100.2"));
        let e = lisp.add(&request).unwrap_err();
        assert_eq!(e, FwdEntryError::AdjacencyResolution(FibError::NoSuchInterface(IfIndex(42))));
        assert_eq!(e.code(), ErrorCode::Unspecified);
        assert_eq!(counts(&lisp), before);

        let l2 = l2_request(mac(1), mac(2)).with_locator(1, 1, nh(42, "198.51.100.2"));
        assert!(lisp.add(&l2).is_err());
        assert_eq!(counts(&lisp), before);
        assert_purged(&mut lisp);

        /* forwarding state errors other than resolution keep their own variant */
        let e = lisp.add_interface(IfIndex(1), true).unwrap_err();
        assert_eq!(e, FwdEntryError::Fib(FibError::InterfaceExists(IfIndex(1))));
        assert_eq!(e.code(), ErrorCode::Unspecified);
        assert_eq!(lisp.set_interface_state(IfIndex(42), true).unwrap_err(), FwdEntryError::Fib(FibError::NoSuchInterface(IfIndex(42))));
    }

    #[test]
    fn test_native_entry_keeps_shared_route() {
        let mut lisp = setup();
        let native = FwdEntryRequest::new(pfx("10.5.0.0/16"), pfx("0.0.0.0/0"), 1)
            .with_negative_action(NegativeAction::NoAction);
        let normal = FwdEntryRequest::new(pfx("10.5.0.0/16"), pfx("10.2.0.0/16"), 1)
            .with_locator(1, 1, nh(1, "198.51.100.1"));
        lisp.add(&native).unwrap();
        lisp.add(&normal).unwrap();
        let eid_fib = lisp.fib().tables.find(FibProtocol::Ip4, 0).unwrap();
        assert_eq!(lisp.fib().tables.len(), 2, "the two entries share the source table");

        /* the native entry still uses the route to the emptied source table */
        lisp.delete(&normal).unwrap();
        assert!(eid_fib.is_sourced(&prefix("10.5.0.0/16"), FibSource::Lisp));
        let Some(Dpo::Lookup { table, .. }) = eid_fib.forwarding(&prefix("10.5.0.0/16")) else { panic!("no route") };
        assert_eq!(lisp.fib().tables.get(table).unwrap().num_entries(FibSource::Lisp), 0);

        lisp.delete(&native).unwrap();
        assert!(!eid_fib.lookup_exact_match(&prefix("10.5.0.0/16")));
        drop(eid_fib);
        assert!(lisp.fib().tables.is_empty());
        assert_purged(&mut lisp);
    }

    #[test]
    #[traced_test]
    fn test_disabled() {
        let mut lisp = LispGpe::new(LispGpeParamsBuilder::default().enabled(false).build().unwrap());
        lisp.add_interface(IfIndex(1), true).unwrap();
        let request = FwdEntryRequest::new(pfx("10.1.0.0/16"), pfx("10.2.0.0/16"), 1)
            .with_locator(1, 1, nh(1, "198.51.100.1"));
        let e = lisp.add(&request).unwrap_err();
        assert_eq!(e, FwdEntryError::SubsystemDisabled);
        assert_eq!(e.code(), ErrorCode::Disabled);

        lisp.enable();
        lisp.add(&request).unwrap();
        lisp.disable();
        assert!(!lisp.is_enabled());
        assert!(lisp.entries().is_empty(), "disabling flushes");
        assert!(lisp.fib().tables.is_empty());
        assert!(logs_contain("Flushed 1 entries"));
    }

    #[test]
    fn test_l2_entry_and_lookup() {
        let mut lisp = setup();
        let before = counts(&lisp);
        let reader = lisp.l2fib_reader();
        let bd = bd_index(&lisp);

        let specific = l2_request(mac(1), mac(2))
            .with_locator(1, 1, nh(1, "198.51.100.1"))
            .with_locator(1, 3, nh(2, "198.51.100.2"));
        let any_src = l2_request(mac(1), Mac::ZERO).with_locator(1, 1, nh(1, "198.51.100.1"));
        let i1 = lisp.add(&specific).unwrap();
        lisp.add(&any_src).unwrap();
        assert_eq!(lisp.fib().adjacencies.len(), 2, "adjacencies are shared");
        assert_eq!(lisp.l2fib().len(), 2);

        let Some(Dpo::LoadBalance(lb)) = reader.lookup(bd, &mac(2), &mac(1)) else { panic!("no entry") };
        assert_eq!(lb.buckets.len(), 2);
        assert_eq!(lb.total_weight(), 4);
        let Some(EntryFwd::L2(fwd)) = lisp.entries().get(i1).map(|e| &e.fwd) else { panic!("not l2") };
        assert_eq!(fwd.dpo.as_ref(), Some(&Dpo::LoadBalance(lb.clone())));

        /* other sources use the any-source entry, other destinations miss */
        let Some(Dpo::LoadBalance(lb)) = reader.lookup(bd, &mac(9), &mac(1)) else { panic!("no entry") };
        assert_eq!(lb.buckets.len(), 1);
        assert_eq!(reader.lookup(bd, &mac(2), &mac(3)), Some(lisp.l2fib().miss()));

        lisp.delete(&specific).unwrap();
        lisp.delete(&any_src).unwrap();
        assert_eq!(counts(&lisp), before);
        assert_eq!(reader.lookup(bd, &mac(2), &mac(1)), Some(lisp.l2fib().miss()));
    }

    #[test]
    fn test_l2_negative_entry() {
        let mut lisp = setup();
        let request = l2_request(mac(1), mac(2)).with_negative_action(NegativeAction::Drop);
        let index = lisp.add(&request).unwrap();
        let entry = lisp.entries().get(index).unwrap();
        assert!(entry.paths.is_empty());
        let key = crate::l2fib::L2FibKey::new(bd_index(&lisp), &mac(2), &mac(1));
        assert_eq!(lisp.l2fib().get(&key), Some(lisp.l2fib().miss()));
        lisp.delete(&request).unwrap();
        assert!(lisp.l2fib().is_empty());
    }

    #[test]
    #[traced_test]
    fn test_l2_back_walk() {
        let mut lisp = setup();
        let reader = lisp.l2fib_reader();
        let bd = bd_index(&lisp);
        let request = l2_request(mac(1), mac(2))
            .with_locator(1, 1, nh(1, "198.51.100.1"))
            .with_locator(2, 1, nh(2, "198.51.100.2"));
        let index = lisp.add(&request).unwrap();
        let paths_before: Vec<_> = lisp.entries().get(index).unwrap().paths.iter().map(|p| p.adjacency.index()).collect();
        let adj = |n: usize| Dpo::adjacency(paths_before[n], DpoProto::Ethernet);
        let buckets = |lisp: &LispGpe| match reader.lookup(bd, &mac(2), &mac(1)) {
            Some(Dpo::LoadBalance(lb)) => lb.buckets.iter().map(|b| b.dpo.clone()).collect::<Vec<_>>(),
            Some(other) => vec![other],
            None => panic!("writer gone: {}", lisp.entries().len()),
        };
        assert_eq!(buckets(&lisp), vec![adj(0)]);

        /* best path goes down: traffic moves to the backup */
        assert_eq!(lisp.set_interface_state(IfIndex(1), false).unwrap(), 1);
        assert_eq!(buckets(&lisp), vec![adj(1)]);

        /* nothing usable: drop, never a stale action */
        assert_eq!(lisp.set_interface_state(IfIndex(2), false).unwrap(), 1);
        assert_eq!(buckets(&lisp), vec![Dpo::drop(DpoProto::Ethernet)]);

        assert_eq!(lisp.set_interface_state(IfIndex(1), true).unwrap(), 1);
        assert_eq!(buckets(&lisp), vec![adj(0)]);

        /* interfaces not used by entries walk nothing */
        assert_eq!(lisp.set_interface_state(IfIndex(0), false).unwrap(), 0);

        let paths_after: Vec<_> = lisp.entries().get(index).unwrap().paths.iter().map(|p| p.adjacency.index()).collect();
        assert_eq!(paths_before, paths_after);

        lisp.delete(&request).unwrap();
        assert_eq!(lisp.set_interface_state(IfIndex(1), false).unwrap(), 0);
    }

    #[test]
    fn test_flush_is_idempotent() {
        let mut lisp = setup();
        let before = counts(&lisp);
        for n in 1..=5u8 {
            lisp.add(&FwdEntryRequest::new(pfx(&format!("10.{n}.0.0/16")), pfx("0.0.0.0/0"), 1)
                .with_locator(n, 1, nh(1, "198.51.100.1"))).unwrap();
            lisp.add(&l2_request(mac(n), Mac::ZERO).with_locator(n, 1, nh(2, "198.51.100.2"))).unwrap();
        }
        lisp.add(&l2_request(mac(9), mac(8)).with_negative_action(NegativeAction::SendMapRequest)).unwrap();
        assert_eq!(lisp.entries().len(), 11);

        assert_eq!(lisp.flush(), 11);
        assert_eq!(counts(&lisp), before);
        assert_purged(&mut lisp);
        assert_eq!(lisp.flush(), 0);
        assert_eq!(counts(&lisp), before);
    }

    #[test]
    fn test_registries_do_not_grow() {
        let mut lisp = LispGpe::new(LispGpeParams::default());
        lisp.add_interface(IfIndex(1), true).unwrap();
        lisp.add_bridge_domain(BD).unwrap();
        for n in 0..500u32 {
            let rmt = format!("198.51.{}.{}", n / 256, n % 256);
            let l2 = FwdEntryRequest::new(EndpointId::Mac(mac(1)), EndpointId::Mac(mac(2)), 1000 + n)
                .with_bd_id(BD)
                .with_locator(1, 1, nh(1, &rmt));
            let l3 = FwdEntryRequest::new(pfx("10.1.0.0/16"), pfx("10.2.0.0/16"), 1000 + n)
                .with_table_id(n)
                .with_locator(1, 1, nh(1, &rmt));
            lisp.add(&l2).unwrap();
            lisp.add(&l3).unwrap();
            lisp.delete(&l2).unwrap();
            lisp.delete(&l3).unwrap();
        }
        assert!(lisp.entries().is_empty());
        assert_purged(&mut lisp);
    }

    #[test]
    fn test_show_entries() {
        let mut lisp = setup();
        let index = lisp.add(&FwdEntryRequest::new(pfx("10.1.0.0/16"), pfx("10.2.0.0/16"), 1)
            .with_table_id(3)
            .with_locator(1, 0, nh(1, "198.51.100.1"))).unwrap();
        lisp.add(&l2_request(mac(1), mac(2)).with_negative_action(NegativeAction::SendMapRequest)).unwrap();
        let slot = crate::pool::slot_of(index);

        let detail = lisp.show_entry(slot);
        assert!(detail.starts_with(&format!("VNI:1 VRF:3 EID: 10.2.0.0/16 -> 10.1.0.0/16  [index:{slot}]\n via:\n  priority:1 weight:1 adj:[")));
        assert!(detail.contains("\n src-fib-index:"));
        assert_eq!(lisp.show_entry(1000), "entry 1000 invalid");

        let all = lisp.show_entries(None);
        assert_eq!(all.lines().filter(|l| l.starts_with("VNI:")).count(), 2);
        let l2 = lisp.show_entries(Some(50));
        assert!(l2.starts_with("VNI:50 BD:100 EID: 02:00:00:00:00:02 -> 02:00:00:00:00:01"));
        assert!(l2.contains("\n Negative - action:send-map-request"));
        assert!(lisp.show_entries(Some(77)).is_empty());
        assert!(lisp.to_string().starts_with("lisp-gpe entries:2"));
    }

    #[test]
    fn test_bridge_domain_in_use() {
        let mut lisp = setup();
        let request = l2_request(mac(1), mac(2)).with_negative_action(NegativeAction::Drop);
        lisp.add(&request).unwrap();
        assert!(lisp.del_bridge_domain(BD).is_err());
        lisp.delete(&request).unwrap();
        assert!(lisp.del_bridge_domain(BD).is_ok());
        assert_eq!(lisp.del_bridge_domain(BD), Err(FwdEntryError::NoSuchBridgeDomain(BD)));
    }

    #[test]
    fn test_vni_table_mapping() {
        let mut lisp = setup();
        lisp.map_vni_to_table(50, 500).unwrap();
        let request = l2_request(mac(1), mac(2)).with_locator(1, 1, nh(1, "198.51.100.1"));
        let index = lisp.add(&request).unwrap();
        let entry = lisp.entries().get(index).unwrap();
        assert_eq!(entry.tenant.table_id, 500);
        assert_eq!(entry.paths[0].adjacency.key().table_id, 500);
        assert!(lisp.map_vni_to_table(50, 501).is_err());
    }

    #[test]
    fn test_random_churn() {
        let mut lisp = LispGpe::new(LispGpeParams::default());
        for ifindex in 0..4 {
            lisp.add_interface(IfIndex(ifindex), true).unwrap();
        }
        lisp.add_bridge_domain(BD).unwrap();
        let before = counts(&lisp);
        let mut rng = rand::rng();
        let mut present = std::collections::HashSet::new();

        for _ in 0..2000 {
            let n: u8 = rng.random_range(0..32);
            let l2 = n % 2 == 0;
            let mut request = if l2 {
                l2_request(mac(n), Mac::ZERO)
            } else {
                FwdEntryRequest::new(pfx(&format!("10.{}.0.0/16", n % 8)), pfx(&format!("172.16.{n}.0/24")), 1)
            };
            if rng.random_bool(0.2) {
                request = request.with_negative_action(NegativeAction::SendMapRequest);
            } else {
                for _ in 0..rng.random_range(1..4) {
                    let ifindex = rng.random_range(0..4);
                    request = request.with_locator(rng.random_range(0..3), rng.random_range(0..4), nh(ifindex, "198.51.100.1"));
                }
            }
            if rng.random_bool(0.1) {
                let ifindex = rng.random_range(0..4);
                lisp.set_interface_state(IfIndex(ifindex), rng.random_bool(0.5)).unwrap();
            }
            if present.contains(&n) {
                lisp.delete(&request).unwrap();
                present.remove(&n);
            } else {
                lisp.add(&request).unwrap();
                present.insert(n);
            }
            assert_eq!(lisp.entries().len(), present.len());
            assert_eq!(lisp.l2fib().len(), present.iter().filter(|n| *n % 2 == 0).count());
        }
        lisp.flush();
        assert_eq!(counts(&lisp), before);
        assert_purged(&mut lisp);
    }
}
