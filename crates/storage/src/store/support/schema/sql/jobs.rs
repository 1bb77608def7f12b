#![forbid(unsafe_code)]

pub(super) const SQL: &str = r#"

        CREATE TABLE IF NOT EXISTS job (
          id INTEGER PRIMARY KEY,
          job_id BIGINT NOT NULL,
          cluster VARCHAR(255) NOT NULL,
          start_time BIGINT NOT NULL,
          user VARCHAR(255) NOT NULL,
          project VARCHAR(255) NOT NULL,
          "partition" VARCHAR(255) NOT NULL,
          array_job_id BIGINT NOT NULL DEFAULT 0,
          duration INT NOT NULL DEFAULT 0,
          job_state VARCHAR(255) NOT NULL,
          meta_data TEXT,
          resources TEXT NOT NULL,
          num_nodes INT NOT NULL,
          num_hwthreads INT NOT NULL DEFAULT 0,
          num_acc INT NOT NULL DEFAULT 0,
          smt TINYINT NOT NULL DEFAULT 1 CHECK(smt IN (0, 1)),
          exclusive TINYINT NOT NULL DEFAULT 1 CHECK(exclusive IN (0, 1, 2)),
          monitoring_status TINYINT NOT NULL DEFAULT 1 CHECK(monitoring_status IN (0, 1, 2, 3)),

          mem_used_max REAL,
          flops_any_avg REAL,
          mem_bw_avg REAL,
          load_avg REAL,
          net_bw_avg REAL,
          file_bw_avg REAL,

          UNIQUE (job_id, cluster, start_time)
        );
"#;
