/// Argument helpers shared by the command line tools.

/// parse decimal or `0x` prefixed hexadecimal
pub fn parse_number(s: &str) -> crate::AResult<usize> {
	let n = if s.starts_with("0x") {
		usize::from_str_radix(&s[2..], 16)?
	} else {
		s.parse::<usize>()?
	};
	Ok(n)
}

pub fn get_param<T>(matches: &clap::ArgMatches, name: &str) -> crate::AResult<T>
where
	T: std::str::FromStr,
	failure::Error: From<<T as std::str::FromStr>::Err>,
{
	let param = match matches.value_of(name) {
		Some(p) => p,
		None => bail!("missing parameter {}", name),
	};
	param.parse::<T>().map_err(|e| {
		let e = failure::Error::from(e);
		let msg = format!("invalid parameter {}: {}", name, e);
		e.context(msg).into()
	})
}
