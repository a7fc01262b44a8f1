use {super::*, crate::source::MockStatFile};

mod entry_parse_tests {
    use super::*;

    // two examples provided in the `proc_stat(5)` man page.
    const EXAMPLE_1: &str = "cpu 10132153 290696 3084719 46828483 16683 0 25195 0 175628 0";
    const EXAMPLE_2: &str = "cpu0 1393280 32966 572056 13343292 6130 0 17875 0 23933 0";

    #[test]
    fn example_1() {
        let entry = EXAMPLE_1.parse::<Entry>().unwrap();
        assert!(matches!(entry, Entry::AllCpu { .. }));
    }

    #[test]
    fn example_2() {
        let Entry::Cpu { id, time } = EXAMPLE_2.parse::<Entry>().unwrap() else {
            panic!("expected a cpu entry");
        };
        assert_eq!(id, CpuId(0));
        assert_eq!(time.user, 1393280);
        assert_eq!(time.idle, 13343292);
    }

    /// the aggregate line is padded with two spaces.
    #[test]
    fn double_space() {
        const EXAMPLE_3: &str = "cpu  10132153 290696 3084719 46828483 16683 0 25195 0 175628 0";
        let entry = EXAMPLE_3.parse::<Entry>().unwrap();
        assert!(matches!(entry, Entry::AllCpu { .. }));
    }

    #[test]
    fn bad_cpu_id() {
        let err = "cpuA 0 0 0 0 0 0 0 0 0 0".parse::<Entry>().unwrap_err();
        assert!(matches!(err, EntryParseError::CpuIdParse(_)));
    }

    #[test]
    fn bad_tick() {
        let err = "cpu0 0 x 0 0".parse::<Entry>().unwrap_err();
        assert!(matches!(err, EntryParseError::TickParse(_)));
    }

    /// pre-2.6.11 kernels only print the first four counters.
    #[test]
    fn short_line() {
        let Entry::Cpu { time, .. } = "cpu3 1 2 3 4".parse::<Entry>().unwrap() else {
            panic!("expected a cpu entry");
        };
        assert_eq!(time.idle, 4);
        assert_eq!(time.steal, 0);
    }

    #[test]
    fn too_few_times() {
        let err = "cpu 1 2 3".parse::<Entry>().unwrap_err();
        assert_eq!(err, EntryParseError::CpuTime { fields: 3 });
    }

    #[test]
    fn too_many_times() {
        const ENTRY: &str = "cpu 10132153 290696 3084719 46828483 16683 0 25195 0 175628 0 0";
        let err = ENTRY.parse::<Entry>().unwrap_err();
        assert_eq!(err, EntryParseError::CpuTime { fields: 11 });
    }

    #[test]
    fn big() {
        const ENTRY: &str = "cpu  5000000000 5000000000 5000000000 5000000000 5000000000 5000000000 5000000000 0 0 0";
        let Entry::AllCpu { time } = ENTRY.parse::<Entry>().unwrap() else {
            panic!("expected the aggregate entry");
        };
        assert_eq!(time.user, 5_000_000_000);
    }

    #[test]
    fn other_entries() {
        for line in [
            "page 5741 1808",
            "intr 1462898",
            "btime 769041601",
            "procs_running 6",
        ] {
            let entry = line.parse::<Entry>().unwrap();
            assert!(matches!(entry, Entry::Other { .. }), "{line}");
        }
    }

    #[test]
    fn empty() {
        assert_eq!("".parse::<Entry>().unwrap_err(), EntryParseError::Empty);
    }
}

mod parse_cpu_id_tests {
    use super::*;

    #[test]
    fn all() {
        assert_eq!(Entry::parse_cpu_id(""), Ok(None));
    }

    #[test]
    fn two() {
        assert_eq!(Entry::parse_cpu_id("2"), Ok(Some(CpuId(2))));
    }

    #[test]
    fn many_cores() {
        assert_eq!(Entry::parse_cpu_id("300"), Ok(Some(CpuId(300))));
    }

    #[test]
    fn a() {
        assert!(matches!(
            Entry::parse_cpu_id("a"),
            Err(EntryParseError::CpuIdParse(_))
        ));
    }
}

mod read_cores_tests {
    use super::*;

    const STAT: &str = "\
cpu  30 6 30 300 10 2 2 0 0 0
cpu1 20 2 10 100 5 1 1 0 0 0
cpu0 10 4 20 200 5 1 1 0 0 0
intr 1462898
ctxt 4128
btime 769041601
";

    #[test]
    fn folds_and_orders_cores() {
        let source = MockStatFile::new([STAT]);
        let cores = read_cores(&source).unwrap();

        assert_eq!(
            cores,
            vec![
                CoreTicks {
                    user: 10,
                    system: 22,
                    idle: 205,
                    nice: 4,
                },
                CoreTicks {
                    user: 20,
                    system: 12,
                    idle: 105,
                    nice: 2,
                },
            ]
        );
    }

    #[test]
    fn missing_file() {
        let source = MockStatFile::default();
        let err = read_cores(&source).unwrap_err();
        assert!(matches!(err, StatReadError::Io(_)));
    }

    #[test]
    fn malformed_line() {
        let source = MockStatFile::new(["cpu0 1 2\n"]);
        let err = read_cores(&source).unwrap_err();
        assert!(matches!(err, StatReadError::Entry(EntryParseError::CpuTime { .. })));
    }
}
